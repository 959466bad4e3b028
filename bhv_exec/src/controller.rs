//! # Controller interface
//!
//! The controller is the behaviour engine which decides how the rover should move. It is fed
//! with the rover's view of the world by the behaviour loop, and is asked for a single decision
//! each cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bhv::{Pose2D, TagDetection};
use log::debug;

use crate::{arbiter::Mode, fence::Fence};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Actuator value used by controllers to mean "leave this actuator where it is".
pub const UNCHANGED_SENTINEL: f64 = -1.0;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A behaviour engine which can be driven by the behaviour loop.
pub trait Controller {
    /// Current wall clock time in milliseconds.
    fn set_current_time(&mut self, time_ms: i64);

    /// Drift corrected center location in the odometry frame.
    fn set_center_location_odom(&mut self, center: Pose2D);

    /// Center location in the map frame.
    fn set_center_location_map(&mut self, center: Pose2D);

    /// Smoothed center location in the map frame, updated whenever a new fix is averaged.
    fn set_averaged_center_location_map(&mut self, center: Pose2D);

    fn set_position_data(&mut self, pose: Pose2D);

    fn set_velocity_data(&mut self, linear_ms: f64, angular_rads: f64);

    fn set_map_position_data(&mut self, pose: Pose2D);

    fn set_map_velocity_data(&mut self, linear_ms: f64, angular_rads: f64);

    /// Synchronised readings from the three sonars, in meters.
    fn set_sonar_data(&mut self, left: f32, center: f32, right: f32);

    fn set_april_tags(&mut self, tags: &[TagDetection]);

    fn set_mode(&mut self, mode: Mode);

    /// Set or clear the virtual fence.
    fn set_virtual_fence(&mut self, fence: Option<Fence>);

    fn add_manual_waypoint(&mut self, location: Pose2D, id: i32);

    fn remove_manual_waypoint(&mut self, id: i32);

    /// Drain the IDs of the manual waypoints the controller has reached since the last call, in
    /// the order they were reached.
    fn cleared_waypoints(&mut self) -> Vec<i32>;

    /// Make a decision for this cycle.
    fn do_work(&mut self) -> Decision;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single decision made by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub kind: DecisionKind,

    /// Left side drive demand
    pub left: f64,

    /// Right side drive demand
    pub right: f64,

    /// New finger angle, or `None` to leave the finger where it is.
    ///
    /// Units: radians
    pub finger_angle: Option<f64>,

    /// New wrist angle, or `None` to leave the wrist where it is.
    ///
    /// Units: radians
    pub wrist_angle: Option<f64>,
}

/// Controller that never drives, used when no behaviour engine is linked in.
///
/// It keeps the latest data it has been given so that it can be inspected, and holds manual
/// waypoints without ever reaching them.
#[derive(Debug, Default)]
pub struct IdleController {
    pub time_ms: i64,
    pub mode: Option<Mode>,
    pub center_odom: Option<Pose2D>,
    pub center_map: Option<Pose2D>,
    pub averaged_center_map: Option<Pose2D>,
    pub pose: Option<Pose2D>,
    pub map_pose: Option<Pose2D>,
    pub sonar: Option<(f32, f32, f32)>,
    pub fence: Option<Fence>,
    pub waypoints: Vec<(i32, Pose2D)>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    /// Apply the drive and actuator demands
    Drive,

    /// Stay put and hold the actuators
    Wait,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Decision {
    /// A decision to wait.
    pub fn wait() -> Self {
        Self {
            kind: DecisionKind::Wait,
            left: 0.0,
            right: 0.0,
            finger_angle: None,
            wrist_angle: None,
        }
    }

    /// A decision to drive without touching the finger or wrist.
    pub fn drive(left: f64, right: f64) -> Self {
        Self {
            kind: DecisionKind::Drive,
            left,
            right,
            finger_angle: None,
            wrist_angle: None,
        }
    }

    /// Build a decision from raw controller output where `-1` marks an unchanged actuator.
    ///
    /// This is the boundary for external controllers which report actuator demands as plain
    /// numbers. Implementations of [`Controller`] wrapping such a planner should build their
    /// [`Decision`] here rather than passing the sentinel through.
    pub fn from_raw(kind: DecisionKind, left: f64, right: f64, finger: f64, wrist: f64) -> Self {
        Self {
            kind,
            left,
            right,
            finger_angle: from_sentinel(finger),
            wrist_angle: from_sentinel(wrist),
        }
    }

    pub fn is_wait(&self) -> bool {
        self.kind == DecisionKind::Wait
    }
}

impl Controller for IdleController {
    fn set_current_time(&mut self, time_ms: i64) {
        self.time_ms = time_ms;
    }

    fn set_center_location_odom(&mut self, center: Pose2D) {
        self.center_odom = Some(center);
    }

    fn set_center_location_map(&mut self, center: Pose2D) {
        self.center_map = Some(center);
    }

    fn set_averaged_center_location_map(&mut self, center: Pose2D) {
        self.averaged_center_map = Some(center);
    }

    fn set_position_data(&mut self, pose: Pose2D) {
        self.pose = Some(pose);
    }

    fn set_velocity_data(&mut self, _linear_ms: f64, _angular_rads: f64) {}

    fn set_map_position_data(&mut self, pose: Pose2D) {
        self.map_pose = Some(pose);
    }

    fn set_map_velocity_data(&mut self, _linear_ms: f64, _angular_rads: f64) {}

    fn set_sonar_data(&mut self, left: f32, center: f32, right: f32) {
        self.sonar = Some((left, center, right));
    }

    fn set_april_tags(&mut self, tags: &[TagDetection]) {
        debug!("IdleController ignoring {} april tags", tags.len());
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = Some(mode);
    }

    fn set_virtual_fence(&mut self, fence: Option<Fence>) {
        self.fence = fence;
    }

    fn add_manual_waypoint(&mut self, location: Pose2D, id: i32) {
        self.waypoints.push((id, location));
    }

    fn remove_manual_waypoint(&mut self, id: i32) {
        self.waypoints.retain(|(i, _)| *i != id);
    }

    fn cleared_waypoints(&mut self) -> Vec<i32> {
        Vec::new()
    }

    fn do_work(&mut self) -> Decision {
        Decision::wait()
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

#[allow(clippy::float_cmp)]
fn from_sentinel(value: f64) -> Option<f64> {
    if value == UNCHANGED_SENTINEL {
        None
    } else {
        Some(value)
    }
}
