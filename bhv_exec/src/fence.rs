//! # Virtual Fence
//!
//! The operator can confine the rover to a region of the arena by sending a fence descriptor. A
//! descriptor is a flat list of numbers:
//!
//! | Shape     | Descriptor                          |
//! |-----------|-------------------------------------|
//! | Disabled  | `[0, ...]`                          |
//! | Circle    | `[1, center_x, center_y, radius]`   |
//! | Rectangle | `[2, center_x, center_y, width, height]` |
//!
//! Descriptors are validated here, the controller only ever sees a well formed [`Fence`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bhv::Pose2D;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A region the rover is allowed to operate in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Fence {
    Circle {
        center: Pose2D,
        radius_m: f64,
    },
    Rectangle {
        center: Pose2D,
        width_m: f64,
        height_m: f64,
    },
}

/// Shape codes used in fence descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FenceShape {
    Circle,
    Rectangle,
}

/// Result of parsing a fence descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FenceCmd {
    /// Remove any active fence
    Disable,

    /// Replace the active fence with this one
    Enable(Fence),
}

#[derive(Debug, Error, PartialEq)]
pub enum FenceError {
    #[error("The fence descriptor is empty")]
    Empty,

    #[error("Unknown fence shape code {0}")]
    UnknownShape(i32),

    #[error("Wrong number of parameters for a {shape:?} fence, expected {expected} found {found}")]
    InvalidParamCount {
        shape: FenceShape,
        expected: usize,
        found: usize,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FenceShape {
    /// Number of elements in a descriptor of this shape, including the shape code.
    pub fn descriptor_len(&self) -> usize {
        match self {
            FenceShape::Circle => 4,
            FenceShape::Rectangle => 5,
        }
    }
}

impl FenceCmd {
    /// Parse a fence descriptor.
    pub fn parse(descriptor: &[f32]) -> Result<Self, FenceError> {
        let code = match descriptor.first() {
            Some(c) => *c as i32,
            None => return Err(FenceError::Empty),
        };

        let shape = match code {
            0 => return Ok(FenceCmd::Disable),
            1 => FenceShape::Circle,
            2 => FenceShape::Rectangle,
            c => return Err(FenceError::UnknownShape(c)),
        };

        if descriptor.len() != shape.descriptor_len() {
            return Err(FenceError::InvalidParamCount {
                shape,
                expected: shape.descriptor_len(),
                found: descriptor.len(),
            });
        }

        let center = Pose2D::new(descriptor[1] as f64, descriptor[2] as f64, 0.0);

        Ok(FenceCmd::Enable(match shape {
            FenceShape::Circle => Fence::Circle {
                center,
                radius_m: descriptor[3] as f64,
            },
            FenceShape::Rectangle => Fence::Rectangle {
                center,
                width_m: descriptor[3] as f64,
                height_m: descriptor[4] as f64,
            },
        }))
    }

    /// The fence the controller should apply, `None` for no fence.
    pub fn fence(&self) -> Option<Fence> {
        match self {
            FenceCmd::Disable => None,
            FenceCmd::Enable(f) => Some(*f),
        }
    }
}
