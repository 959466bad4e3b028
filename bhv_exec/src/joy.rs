//! # Joystick mixing
//!
//! Converts the operator's gamepad axes into a skid steer demand for manual driving.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bhv::{DriveCmd, JoyMsg};
use thiserror::Error;
use util::maths::{clamp, deadzone};

use crate::params::BhvParams;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum JoyError {
    #[error("Expected at least {expected} joystick axes, found {found}")]
    TooFewAxes { expected: usize, found: usize },
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Mix the joystick axes into left and right motor commands.
///
/// Each side is clamped to `[-joy_max_motor_cmd, joy_max_motor_cmd]`.
pub fn mix(joy: &JoyMsg, params: &BhvParams) -> Result<DriveCmd, JoyError> {
    let needed = params.joy_linear_axis.max(params.joy_angular_axis) + 1;

    if joy.axes.len() < needed {
        return Err(JoyError::TooFewAxes {
            expected: needed,
            found: joy.axes.len(),
        });
    }

    let max = params.joy_max_motor_cmd;

    let linear = deadzone(joy.axes[params.joy_linear_axis], params.joy_deadzone) as f64 * max;
    let angular = deadzone(joy.axes[params.joy_angular_axis], params.joy_deadzone) as f64 * max;

    Ok(DriveCmd::new(
        clamp(linear - angular, -max, max),
        clamp(linear + angular, -max, max),
    ))
}
