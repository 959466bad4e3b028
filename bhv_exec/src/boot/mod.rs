//! # Swarm bootstrap
//!
//! Shortly after startup every rover announces itself to the rest of the swarm in two steps:
//!
//! 1. A `Boot` marker is broadcast once. Each rover which has already sent it's own boot marker
//!    counts the boot markers it recieves, giving a rough idea of how many rovers are present.
//! 2. The rover's published name is broadcast once. Each rover compares recieved names with it's
//!    own and reports whether it matched.
//!
//! Broadcasts are best effort, lost messages are not retried and simply lead to an under-count.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod latch;

pub use latch::BroadcastLatch;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::swarm::SwarmMsg;
use log::{debug, warn};

use crate::{outbox::Outbox, params::BhvParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BootCoordinator {
    /// This rover's published name
    name: String,

    boot_threshold_s: f64,
    identity_threshold_s: f64,
    max_swarm_size: u32,

    boot: BroadcastLatch,
    identity: BroadcastLatch,

    /// Number of boot markers recieved after our own was sent
    boot_count: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BootCoordinator {
    pub fn new(name: &str, params: &BhvParams) -> Self {
        Self {
            name: name.to_string(),
            boot_threshold_s: params.boot_broadcast_s,
            identity_threshold_s: params.identity_broadcast_s,
            max_swarm_size: params.max_swarm_size,
            boot: BroadcastLatch::default(),
            identity: BroadcastLatch::default(),
            boot_count: 0,
        }
    }

    pub fn boot_count(&self) -> u32 {
        self.boot_count
    }

    pub fn boot_latch(&self) -> BroadcastLatch {
        self.boot
    }

    pub fn identity_latch(&self) -> BroadcastLatch {
        self.identity
    }

    /// Send any broadcasts whose thresholds have been crossed.
    pub fn tick(&mut self, elapsed_s: f64, outbox: &mut Outbox) {
        if self.boot.trigger(elapsed_s, self.boot_threshold_s) {
            debug!("Sending boot broadcast at {:.02} s", elapsed_s);
            outbox.push_swarm(SwarmMsg::Boot);
            self.boot.complete();
        }

        if self.identity.trigger(elapsed_s, self.identity_threshold_s) {
            debug!("Sending identity broadcast at {:.02} s", elapsed_s);
            outbox.push_swarm(SwarmMsg::Identity(self.name.clone()));
            self.identity.complete();
        }
    }

    /// Handle a message recieved from the swarm.
    pub fn handle(&mut self, msg: &SwarmMsg, outbox: &mut Outbox) {
        match msg {
            SwarmMsg::Boot => self.handle_boot(outbox),
            SwarmMsg::Identity(other) => self.handle_identity(other, outbox),
        }
    }

    fn handle_boot(&mut self, outbox: &mut Outbox) {
        // Boots heard before our own broadcast aren't counted
        if !self.boot.has_broadcast() {
            return;
        }

        self.boot_count += 1;

        if self.boot_count <= self.max_swarm_size {
            outbox.info_log(format!("Boot count is {}", self.boot_count));
        } else if self.boot_count == self.max_swarm_size + 1 {
            warn!(
                "Recieved more than {} boot broadcasts, the swarm is larger than supported",
                self.max_swarm_size
            );
        }
    }

    fn handle_identity(&mut self, other: &str, outbox: &mut Outbox) {
        if other == self.name {
            outbox.info_log(format!("Identity match, I am {}", self.name));
        } else {
            outbox.info_log(format!(
                "Identity mismatch, recieved {} but I am {}",
                other, self.name
            ));
        }
    }
}
