//! Manual waypoint requests

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bhv::{Pose2D, WaypointAction, WaypointMsg};

use super::{Arbiter, Mode};
use crate::{controller::Controller, outbox::Outbox};

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Arbiter {
    /// Handle a manual waypoint request from the operator.
    ///
    /// Added waypoints are placed at the rover's current odometry position and switch the rover
    /// into manual mode. A reached waypoint switches the rover back into autonomous mode.
    pub fn handle_waypoint<C: Controller>(
        &mut self,
        msg: &WaypointMsg,
        rover_pose: &Pose2D,
        ctrl: &mut C,
        outbox: &mut Outbox,
    ) {
        match msg.action {
            WaypointAction::Add => {
                ctrl.add_manual_waypoint(Pose2D::new(rover_pose.x, rover_pose.y, 0.0), msg.id);
                outbox.info_log(format!("Entering manual mode to reach waypoint {}", msg.id));
                self.set_mode(Mode::Manual, ctrl, outbox);
            }
            WaypointAction::Remove => {
                ctrl.remove_manual_waypoint(msg.id);
            }
            WaypointAction::Reached => {
                outbox.info_log(format!(
                    "Entering autonomous mode after reaching waypoint {}",
                    msg.id
                ));
                self.set_mode(Mode::Autonomous, ctrl, outbox);
            }
        }
    }
}
