//! # Center estimation
//!
//! Every rover in the swarm keeps an estimate of where the shared center (the collection zone)
//! is. Two estimates are kept:
//!
//! - `center_odom`: the center in the rover's odometry frame, nudged towards the map frame
//!   estimate by the [`DriftCorrector`] as odometry drifts.
//! - `center_map`: the center in the map frame, smoothed by the [`CenterAvgFilter`] as new fixes
//!   arrive.
//!
//! Both are seeded once, at the end of the start delay, a fixed standoff ahead of the rover.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod avg;
mod drift;

pub use avg::{CenterAvgFilter, RingAvg};
pub use drift::{DriftCorrector, DriftOutcome};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bhv::Pose2D;

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Place the center `standoff_m` ahead of the rover along it's heading.
///
/// The returned pose has zero heading.
pub fn seed(rover_pose: &Pose2D, standoff_m: f64) -> Pose2D {
    Pose2D::new(
        rover_pose.x + standoff_m * rover_pose.theta.cos(),
        rover_pose.y + standoff_m * rover_pose.theta.sin(),
        0.0,
    )
}
