//! # Behaviour interface
//!
//! Messages recieved by the behaviour executable from the rover's sensors, the operator and the
//! transform publishers, and the messages it sends back out to the drivers and the ground.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A position and heading in a 2D frame.
///
/// Which frame the pose is in is given by the context it's used in.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    /// Position along the frame's X axis
    ///
    /// Units: meters
    pub x: f64,

    /// Position along the frame's Y axis
    ///
    /// Units: meters
    pub y: f64,

    /// Heading, the angle to the frame's +X axis
    ///
    /// Units: radians
    pub theta: f64,
}

/// Joystick state from the operator's gamepad.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoyMsg {
    /// Raw axis values, each in the range [-1, 1]
    pub axes: Vec<f32>,
}

/// A single April tag detection from the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TagDetection {
    /// The ID encoded in the tag
    pub id: i32,

    /// Position of the tag in the camera frame, [x, y, z]
    ///
    /// Units: meters
    pub position_m: [f64; 3],

    /// Orientation of the tag in the camera frame as a quaternion, [x, y, z, w]
    pub orientation_q: [f64; 4],
}

/// An odometry estimate of the rover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OdomMsg {
    /// Time at which the estimate is valid
    pub stamp: DateTime<Utc>,

    /// Position of the rover, [x, y, z]
    ///
    /// Units: meters
    pub position_m: [f64; 3],

    /// Attitude of the rover as a quaternion, [x, y, z, w]
    pub attitude_q: [f64; 4],

    /// Forward speed of the rover
    ///
    /// Units: meters/second
    pub linear_vel_ms: f64,

    /// Turn rate of the rover about it's Z+ axis
    ///
    /// Units: radians/second
    pub angular_vel_rads: f64,
}

/// A reading from one of the rover's three sonars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeMsg {
    /// Time the reading was taken
    pub stamp: DateTime<Utc>,

    /// Which sonar produced the reading
    pub sonar: SonarId,

    /// Measured range
    ///
    /// Units: meters
    pub range_m: f32,
}

/// A manual waypoint request, or feedback that a waypoint has been reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointMsg {
    /// Identity of the waypoint
    pub id: i32,

    /// What is being requested of (or reported about) the waypoint
    pub action: WaypointAction,

    /// Requested X position, currently unused as waypoints are placed at the rover's position
    pub x: f64,

    /// Requested Y position, currently unused as waypoints are placed at the rover's position
    pub y: f64,
}

/// Differential drive demand.
///
/// In manual mode these are motor commands in [-255, 255], in autonomous mode they are whatever
/// the controller produced.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveCmd {
    pub left: f64,
    pub right: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Sonar identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SonarId {
    Left,
    Center,
    Right,
}

/// Actions that can be performed on a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaypointAction {
    Add,
    Remove,
    Reached,
}

/// Inbound messages to the behaviour executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BhvInput {
    /// Operator joystick axes
    Joystick(JoyMsg),

    /// Raw operating mode code, 0/1 being manual and 2/3 autonomous
    Mode(u8),

    /// April tags currently in view
    Targets(Vec<TagDetection>),

    /// Filtered odometry, in the rover's odometry frame
    Odometry(OdomMsg),

    /// Globally referenced odometry, in the map frame
    MapOdometry(OdomMsg),

    /// A reading from a single sonar
    Sonar(RangeMsg),

    /// Virtual fence descriptor.
    ///
    /// The first element is the shape code (0 = off, 1 = circle, 2 = rectangle), then the center
    /// x and y, then either the radius or the width and height.
    VirtualFence(Vec<f32>),

    /// Manual waypoint request
    Waypoint(WaypointMsg),
}

/// Outbound messages from the behaviour executable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BhvOutput {
    /// Current state of the behaviour state machine, only sent on change
    StateMachine(String),

    /// Periodic status of the executable
    Status(String),

    /// Human readable log line for the operator
    InfoLog(String),

    /// Drive demand
    DriveControl(DriveCmd),

    /// Finger angle demand
    ///
    /// Units: radians
    FingerAngle(f64),

    /// Wrist angle demand
    ///
    /// Units: radians
    WristAngle(f64),

    /// Feedback on a manual waypoint
    WaypointFeedback(WaypointMsg),

    /// Heartbeat, so the ground knows the executable is alive
    Heartbeat,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose2D {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }
}

impl DriveCmd {
    /// A demand which stops the rover.
    pub const STOP: DriveCmd = DriveCmd {
        left: 0.0,
        right: 0.0,
    };

    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}
