//! # Swarm interface
//!
//! Broadcasts shared between every rover in the swarm. These are used during startup to let the
//! rovers know who else is present.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A message on the shared swarm channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwarmMsg {
    /// Marker sent once by each rover when it has finished booting
    Boot,

    /// The published name of the sending rover, sent once after the boot broadcast
    Identity(String),
}
