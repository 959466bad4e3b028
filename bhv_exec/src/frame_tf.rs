//! # Frame transforms
//!
//! The rover knows where it is in two frames:
//!
//! - `Odom`: the rover's own odometry frame, smooth but drifting over time.
//! - `Map`: the globally referenced frame shared by the whole swarm.
//!
//! Since both frames describe the same physical rover body, the transform between them can be
//! recovered from a pair of simultaneous poses, one in each frame. [`PoseFrameTf`] does exactly
//! this using the most recent odometry and map estimates.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use comms_if::bhv::{BhvInput, OdomMsg, Pose2D};
use nalgebra::{Isometry2, Quaternion, UnitQuaternion, Vector2};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of transforms between the rover's frames.
pub trait FrameTransform {
    /// Express `pose`, given in frame `from`, in frame `to`.
    ///
    /// The transform must be known to within `timeout_s` seconds, otherwise
    /// [`TfError::Timeout`] is returned.
    fn transform_pose(
        &self,
        pose: Pose2D,
        from: Frame,
        to: Frame,
        timeout_s: f64,
    ) -> Result<Pose2D, TfError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Frame transform built from the latest odometry and map poses of the rover.
#[derive(Debug, Default, Clone)]
pub struct PoseFrameTf {
    odom: Option<StampedPose>,
    map: Option<StampedPose>,
}

#[derive(Debug, Clone, Copy)]
struct StampedPose {
    stamp: DateTime<Utc>,
    pose: Pose2D,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Odom,
    Map,
}

#[derive(Debug, Error, PartialEq)]
pub enum TfError {
    #[error("No pose of the rover in the {0:?} frame has been recieved")]
    NoData(Frame),

    #[error(
        "The odom and map poses are {skew_s:.03} s apart, which is more than the {timeout_s:.03} \
         s timeout"
    )]
    Timeout { skew_s: f64, timeout_s: f64 },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PoseFrameTf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the pose of the rover in the given frame.
    pub fn set_pose(&mut self, frame: Frame, stamp: DateTime<Utc>, pose: Pose2D) {
        let sp = Some(StampedPose { stamp, pose });

        match frame {
            Frame::Odom => self.odom = sp,
            Frame::Map => self.map = sp,
        }
    }

    /// Update from an inbound message, only odometry messages have any effect.
    pub fn observe(&mut self, input: &BhvInput) {
        match input {
            BhvInput::Odometry(o) => self.set_pose(Frame::Odom, o.stamp, pose_from_odom(o)),
            BhvInput::MapOdometry(o) => self.set_pose(Frame::Map, o.stamp, pose_from_odom(o)),
            _ => (),
        }
    }

    /// Transform taking map frame poses into the odom frame.
    fn map_to_odom(&self, timeout_s: f64) -> Result<Isometry2<f64>, TfError> {
        let odom = self.odom.ok_or(TfError::NoData(Frame::Odom))?;
        let map = self.map.ok_or(TfError::NoData(Frame::Map))?;

        let skew_s = (odom.stamp - map.stamp)
            .num_microseconds()
            .map(|us| (us as f64 * 1e-6).abs())
            .unwrap_or(std::f64::INFINITY);

        if skew_s > timeout_s {
            return Err(TfError::Timeout { skew_s, timeout_s });
        }

        Ok(to_iso(&odom.pose) * to_iso(&map.pose).inverse())
    }
}

impl FrameTransform for PoseFrameTf {
    fn transform_pose(
        &self,
        pose: Pose2D,
        from: Frame,
        to: Frame,
        timeout_s: f64,
    ) -> Result<Pose2D, TfError> {
        let tf = match (from, to) {
            (Frame::Map, Frame::Odom) => self.map_to_odom(timeout_s)?,
            (Frame::Odom, Frame::Map) => self.map_to_odom(timeout_s)?.inverse(),
            _ => return Ok(pose),
        };

        Ok(from_iso(&(tf * to_iso(&pose))))
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Extract the planar pose of the rover from an odometry message.
pub fn pose_from_odom(msg: &OdomMsg) -> Pose2D {
    let [x, y, z, w] = msg.attitude_q;
    let q = UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z));

    Pose2D::new(msg.position_m[0], msg.position_m[1], q.euler_angles().2)
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn to_iso(pose: &Pose2D) -> Isometry2<f64> {
    Isometry2::new(Vector2::new(pose.x, pose.y), pose.theta)
}

fn from_iso(iso: &Isometry2<f64>) -> Pose2D {
    Pose2D::new(
        iso.translation.vector.x,
        iso.translation.vector.y,
        iso.rotation.angle(),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;
    use std::f64::consts::FRAC_PI_2;

    fn assert_pose_eq(a: Pose2D, b: Pose2D) {
        assert!(
            (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9 && (a.theta - b.theta).abs() < 1e-9,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_map_to_odom_offset() -> Result<(), TfError> {
        let now = Utc::now();
        let mut tf = PoseFrameTf::new();

        // Rover at the odom origin but at (10, 5) in the map, same heading
        tf.set_pose(Frame::Odom, now, Pose2D::new(0.0, 0.0, 0.0));
        tf.set_pose(Frame::Map, now, Pose2D::new(10.0, 5.0, 0.0));

        let p = tf.transform_pose(Pose2D::new(11.3, 5.0, 0.0), Frame::Map, Frame::Odom, 1.0)?;
        assert_pose_eq(p, Pose2D::new(1.3, 0.0, 0.0));

        // And back again
        let p = tf.transform_pose(p, Frame::Odom, Frame::Map, 1.0)?;
        assert_pose_eq(p, Pose2D::new(11.3, 5.0, 0.0));

        Ok(())
    }

    #[test]
    fn test_map_to_odom_rotated() -> Result<(), TfError> {
        let now = Utc::now();
        let mut tf = PoseFrameTf::new();

        // Map frame is rotated a quarter turn from odom
        tf.set_pose(Frame::Odom, now, Pose2D::new(0.0, 0.0, 0.0));
        tf.set_pose(Frame::Map, now, Pose2D::new(0.0, 0.0, FRAC_PI_2));

        let p = tf.transform_pose(Pose2D::new(0.0, 1.0, FRAC_PI_2), Frame::Map, Frame::Odom, 1.0)?;
        assert_pose_eq(p, Pose2D::new(1.0, 0.0, 0.0));

        Ok(())
    }

    #[test]
    fn test_errors() {
        let now = Utc::now();
        let mut tf = PoseFrameTf::new();
        let p = Pose2D::default();

        assert_eq!(
            tf.transform_pose(p, Frame::Map, Frame::Odom, 1.0),
            Err(TfError::NoData(Frame::Odom))
        );

        tf.set_pose(Frame::Odom, now, p);
        assert_eq!(
            tf.transform_pose(p, Frame::Map, Frame::Odom, 1.0),
            Err(TfError::NoData(Frame::Map))
        );

        tf.set_pose(Frame::Map, now - Duration::milliseconds(1500), p);
        assert!(matches!(
            tf.transform_pose(p, Frame::Map, Frame::Odom, 1.0),
            Err(TfError::Timeout { .. })
        ));

        // Same frame never fails
        assert_eq!(tf.transform_pose(p, Frame::Map, Frame::Map, 1.0), Ok(p));
    }

    #[test]
    fn test_pose_from_odom() {
        let half = std::f64::consts::FRAC_1_SQRT_2;
        let msg = OdomMsg {
            stamp: Utc::now(),
            position_m: [1.0, 2.0, 0.0],
            attitude_q: [0.0, 0.0, half, half],
            linear_vel_ms: 0.0,
            angular_vel_rads: 0.0,
        };

        assert_pose_eq(pose_from_odom(&msg), Pose2D::new(1.0, 2.0, FRAC_PI_2));
    }
}
