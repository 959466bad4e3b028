//! Odometry frame center drift correction

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bhv::Pose2D;
use nalgebra::Vector2;

use crate::frame_tf::{Frame, FrameTransform, TfError};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Moves the odometry frame center towards the map frame center, one bounded step per cycle.
#[derive(Debug, Clone)]
pub struct DriftCorrector {
    /// Distance below which no correction is made.
    ///
    /// Units: meters
    pub tolerance_m: f64,

    /// Maximum age difference accepted in the frame transform.
    ///
    /// Units: seconds
    pub tf_timeout_s: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// What happened during a single correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftOutcome {
    /// The estimate was moved one unit step towards the reference
    Corrected {
        /// Distance to the reference before the step
        distance_m: f64,
    },

    /// The estimate is within tolerance of the reference
    WithinTolerance,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriftCorrector {
    pub fn new(tolerance_m: f64, tf_timeout_s: f64) -> Self {
        Self {
            tolerance_m,
            tf_timeout_s,
        }
    }

    /// Correct `center_odom` using `center_map` as the reference.
    ///
    /// If the transform fails `center_odom` is left untouched and the error returned.
    pub fn correct(
        &self,
        center_odom: &mut Pose2D,
        center_map: &Pose2D,
        tf: &dyn FrameTransform,
    ) -> Result<DriftOutcome, TfError> {
        let reference = tf.transform_pose(*center_map, Frame::Map, Frame::Odom, self.tf_timeout_s)?;

        let d = Vector2::new(reference.x - center_odom.x, reference.y - center_odom.y);
        let distance_m = d.norm();

        if distance_m > self.tolerance_m {
            let step = d / distance_m;
            center_odom.x += step.x;
            center_odom.y += step.y;

            Ok(DriftOutcome::Corrected { distance_m })
        } else {
            Ok(DriftOutcome::WithinTolerance)
        }
    }
}
