//! # Mode arbiter
//!
//! Decides what reaches the actuators. In manual mode the operator drives the rover and the
//! controller is only allowed to drive towards manual waypoints. In autonomous mode the
//! controller's decision is applied directly.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod waypoint;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bhv::{BhvOutput, DriveCmd, WaypointAction, WaypointMsg};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    controller::{Controller, Decision},
    outbox::Outbox,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Arbiter {
    mode: Mode,

    /// Last finger angle sent to the actuator
    ///
    /// Units: radians
    prev_finger: f64,

    /// Last wrist angle sent to the actuator
    ///
    /// Units: radians
    prev_wrist: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Operating mode of the rover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Manual,
    Autonomous,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Mode {
    /// Decode a raw mode code. Codes 2 and 3 are autonomous, anything else is manual.
    pub fn from_code(code: u8) -> Self {
        match code {
            2 | 3 => Mode::Autonomous,
            _ => Mode::Manual,
        }
    }

    /// State string shown to the operator.
    pub fn status_str(&self) -> &'static str {
        match self {
            Mode::Manual => "WAITING",
            Mode::Autonomous => "AUTONOMOUS",
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Manual
    }
}

impl Default for Arbiter {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            prev_finger: 0.0,
            prev_wrist: 0.0,
        }
    }
}

impl Arbiter {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Change the operating mode.
    ///
    /// A stop command is always sent, even if the mode hasn't changed, so that no drive demand
    /// survives a mode change.
    pub fn set_mode<C: Controller>(&mut self, mode: Mode, ctrl: &mut C, outbox: &mut Outbox) {
        if mode != self.mode {
            info!("Mode changed from {:?} to {:?}", self.mode, mode);
        }

        self.mode = mode;
        ctrl.set_mode(mode);
        outbox.drive(DriveCmd::STOP);
    }

    /// Turn the controller's decision into actuator demands according to the current mode.
    pub fn dispatch<C: Controller>(&mut self, decision: &Decision, ctrl: &mut C, outbox: &mut Outbox) {
        match self.mode {
            Mode::Manual => {
                for id in ctrl.cleared_waypoints() {
                    outbox.push(BhvOutput::WaypointFeedback(WaypointMsg {
                        id,
                        action: WaypointAction::Reached,
                        x: 0.0,
                        y: 0.0,
                    }));
                }

                // Without a drive decision the operator's joystick is in charge
                if !decision.is_wait() {
                    outbox.drive(DriveCmd::new(decision.left, decision.right));
                }
            }
            Mode::Autonomous => {
                if decision.is_wait() {
                    outbox.drive(DriveCmd::STOP);
                    outbox.push(BhvOutput::FingerAngle(self.prev_finger));
                    outbox.push(BhvOutput::WristAngle(self.prev_wrist));
                } else {
                    outbox.drive(DriveCmd::new(decision.left, decision.right));

                    if let Some(finger) = decision.finger_angle {
                        outbox.push(BhvOutput::FingerAngle(finger));
                        self.prev_finger = finger;
                    }

                    if let Some(wrist) = decision.wrist_angle {
                        outbox.push(BhvOutput::WristAngle(wrist));
                        self.prev_wrist = wrist;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::RecordingController;

    #[test]
    fn test_from_code() {
        assert_eq!(Mode::from_code(0), Mode::Manual);
        assert_eq!(Mode::from_code(1), Mode::Manual);
        assert_eq!(Mode::from_code(2), Mode::Autonomous);
        assert_eq!(Mode::from_code(3), Mode::Autonomous);
        assert_eq!(Mode::from_code(200), Mode::Manual);
    }

    #[test]
    fn test_set_mode_stops() {
        let mut arb = Arbiter::default();
        let mut ctrl = RecordingController::default();
        let mut outbox = Outbox::default();

        arb.set_mode(Mode::Autonomous, &mut ctrl, &mut outbox);
        arb.set_mode(Mode::Manual, &mut ctrl, &mut outbox);

        assert_eq!(ctrl.modes, vec![Mode::Autonomous, Mode::Manual]);
        assert_eq!(
            outbox.bhv,
            vec![
                BhvOutput::DriveControl(DriveCmd::STOP),
                BhvOutput::DriveControl(DriveCmd::STOP)
            ]
        );
    }

    #[test]
    fn test_auto_drive_and_hold() {
        let mut arb = Arbiter::default();
        let mut ctrl = RecordingController::default();
        let mut outbox = Outbox::default();
        arb.set_mode(Mode::Autonomous, &mut ctrl, &mut outbox);
        outbox.take();

        // Finger moves, wrist unchanged
        let mut d = Decision::drive(0.2, 0.3);
        d.finger_angle = Some(1.2);
        arb.dispatch(&d, &mut ctrl, &mut outbox);

        assert_eq!(
            outbox.take().bhv,
            vec![
                BhvOutput::DriveControl(DriveCmd::new(0.2, 0.3)),
                BhvOutput::FingerAngle(1.2)
            ]
        );

        // Wait holds the last finger and the initial wrist
        arb.dispatch(&Decision::wait(), &mut ctrl, &mut outbox);
        assert_eq!(
            outbox.take().bhv,
            vec![
                BhvOutput::DriveControl(DriveCmd::STOP),
                BhvOutput::FingerAngle(1.2),
                BhvOutput::WristAngle(0.0)
            ]
        );
    }

    #[test]
    fn test_manual_dispatch() {
        let mut arb = Arbiter::default();
        let mut ctrl = RecordingController::default();
        let mut outbox = Outbox::default();

        ctrl.cleared = vec![4, 2];

        arb.dispatch(&Decision::wait(), &mut ctrl, &mut outbox);
        assert_eq!(
            outbox.take().bhv,
            vec![
                BhvOutput::WaypointFeedback(WaypointMsg {
                    id: 4,
                    action: WaypointAction::Reached,
                    x: 0.0,
                    y: 0.0
                }),
                BhvOutput::WaypointFeedback(WaypointMsg {
                    id: 2,
                    action: WaypointAction::Reached,
                    x: 0.0,
                    y: 0.0
                }),
            ]
        );

        // Drive decisions towards a waypoint are applied, actuators untouched
        let mut d = Decision::drive(0.1, -0.1);
        d.finger_angle = Some(0.5);
        arb.dispatch(&d, &mut ctrl, &mut outbox);
        assert_eq!(
            outbox.take().bhv,
            vec![BhvOutput::DriveControl(DriveCmd::new(0.1, -0.1))]
        );
    }
}
