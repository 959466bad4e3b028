//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the behaviour software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Messages exchanged between the behaviour executable and the rest of the rover
pub mod bhv;

/// Messages broadcast between all members of the swarm
pub mod swarm;

/// Network module
pub mod net;
