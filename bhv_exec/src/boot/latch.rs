//! One shot broadcast latch

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Tracks a broadcast which must be sent exactly once, after a time threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastLatch {
    /// The threshold has not been crossed yet
    NotStarted,

    /// The threshold has been crossed and the broadcast is being sent
    Broadcast,

    /// The broadcast has been sent, nothing more will happen
    Done,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for BroadcastLatch {
    fn default() -> Self {
        BroadcastLatch::NotStarted
    }
}

impl BroadcastLatch {
    /// Returns true the first time `elapsed_s` is strictly greater than `threshold_s`, moving the
    /// latch into `Broadcast`. The caller must send the broadcast and then call `complete()`.
    pub fn trigger(&mut self, elapsed_s: f64, threshold_s: f64) -> bool {
        match self {
            BroadcastLatch::NotStarted if elapsed_s > threshold_s => {
                *self = BroadcastLatch::Broadcast;
                true
            }
            _ => false,
        }
    }

    /// Mark the broadcast as sent.
    pub fn complete(&mut self) {
        if *self == BroadcastLatch::Broadcast {
            *self = BroadcastLatch::Done;
        }
    }

    /// True once the threshold has been crossed.
    pub fn has_broadcast(&self) -> bool {
        *self != BroadcastLatch::NotStarted
    }
}
