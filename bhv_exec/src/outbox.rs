//! # Outbox
//!
//! Messages produced during a cycle, waiting to be published by the executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    bhv::{BhvOutput, DriveCmd},
    swarm::SwarmMsg,
};
use log::info;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
pub struct Outbox {
    /// Messages for the rover's own output channels, in the order they were produced
    pub bhv: Vec<BhvOutput>,

    /// Messages for the swarm
    pub swarm: Vec<SwarmMsg>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Outbox {
    pub fn push(&mut self, msg: BhvOutput) {
        self.bhv.push(msg);
    }

    pub fn push_swarm(&mut self, msg: SwarmMsg) {
        self.swarm.push(msg);
    }

    pub fn drive(&mut self, cmd: DriveCmd) {
        self.bhv.push(BhvOutput::DriveControl(cmd));
    }

    /// Log a line locally and publish it to the operator.
    pub fn info_log<S: Into<String>>(&mut self, line: S) {
        let line = line.into();
        info!("{}", line);
        self.bhv.push(BhvOutput::InfoLog(line));
    }

    pub fn is_empty(&self) -> bool {
        self.bhv.is_empty() && self.swarm.is_empty()
    }

    /// Take all pending messages, leaving the outbox empty.
    pub fn take(&mut self) -> Outbox {
        std::mem::take(self)
    }
}
