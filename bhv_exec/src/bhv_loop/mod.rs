//! # Behaviour loop
//!
//! The behaviour loop owns all of the rover's behaviour state and is driven by the executable:
//! inbound messages are handed over one at a time with [`BhvLoop::handle_input`] and
//! [`BhvLoop::handle_swarm`], and once per cycle [`BhvLoop::tick`] is called. Everything the loop
//! wants to publish is left in the outbox, to be collected with [`BhvLoop::take_outbox`].
//!
//! Each tick:
//!
//! 1. Publishes the periodic "online" status and heartbeat when due.
//! 2. Does nothing else until the start delay has elapsed. On the first tick after the delay the
//!    center estimates are seeded.
//! 3. Sends any due swarm broadcasts.
//! 4. Corrects the odometry frame center for drift.
//! 5. Asks the controller for a decision and passes it to the arbiter.
//! 6. Publishes the state machine string if it has changed.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod run_time;

pub use run_time::RunTime;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    bhv::{BhvInput, BhvOutput},
    swarm::SwarmMsg,
};
use log::{debug, info, trace, warn};
use thiserror::Error;

use crate::{
    arbiter::Mode,
    center::{self, DriftOutcome},
    controller::Controller,
    data_store::DataStore,
    fence::{FenceCmd, FenceError},
    frame_tf::{pose_from_odom, FrameTransform},
    joy::{self, JoyError},
    outbox::Outbox,
    params::BhvParams,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Status published periodically to show the executable is running.
pub const ONLINE_STATUS: &str = "online";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The behaviour loop, generic over the controller making the decisions.
pub struct BhvLoop<C: Controller> {
    pub ds: DataStore,
    pub ctrl: C,
}

/// Time as seen by a single tick.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    /// Seconds since the executable started
    pub elapsed_s: f64,

    /// Wall clock time in milliseconds since the unix epoch
    pub now_ms: i64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors from handling an inbound message. None of these are fatal, the message is dropped.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Invalid virtual fence: {0}")]
    Fence(#[from] FenceError),

    #[error("Invalid joystick message: {0}")]
    Joystick(#[from] JoyError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<C: Controller> BhvLoop<C> {
    /// Create a new loop for the rover with the given published name.
    pub fn new(name: &str, params: BhvParams, ctrl: C) -> Self {
        let mut ds = DataStore::new(name, params);

        ds.outbox.info_log("Log Started");
        ds.outbox.info_log(format!(
            "Start delay is {:.1} seconds",
            ds.params.start_delay_s
        ));

        Self { ds, ctrl }
    }

    /// Collect everything published since the last call.
    pub fn take_outbox(&mut self) -> Outbox {
        self.ds.outbox.take()
    }

    pub fn mode(&self) -> Mode {
        self.ds.arbiter.mode()
    }

    /// Handle a single inbound message.
    pub fn handle_input(&mut self, input: BhvInput) -> Result<(), InputError> {
        match input {
            BhvInput::Joystick(joy) => {
                if self.mode() == Mode::Manual {
                    let cmd = joy::mix(&joy, &self.ds.params)?;
                    self.ds.outbox.drive(cmd);
                }
            }
            BhvInput::Mode(code) => {
                self.ds
                    .arbiter
                    .set_mode(Mode::from_code(code), &mut self.ctrl, &mut self.ds.outbox);
            }
            BhvInput::Targets(tags) => {
                // Tags could trigger autonomous behaviours so aren't passed on in manual
                if self.mode() == Mode::Autonomous && !tags.is_empty() {
                    self.ctrl.set_april_tags(&tags);
                }
            }
            BhvInput::Odometry(odom) => {
                self.ds.pose_odom = pose_from_odom(&odom);
                self.ctrl.set_position_data(self.ds.pose_odom);
                self.ctrl
                    .set_velocity_data(odom.linear_vel_ms, odom.angular_vel_rads);
            }
            BhvInput::MapOdometry(odom) => {
                self.ds.pose_map = pose_from_odom(&odom);
                self.ctrl.set_map_position_data(self.ds.pose_map);
                self.ctrl
                    .set_map_velocity_data(odom.linear_vel_ms, odom.angular_vel_rads);
            }
            BhvInput::Sonar(range) => {
                if let Some(t) = self.ds.sonar_sync.push(range) {
                    self.ctrl.set_sonar_data(t.left, t.center, t.right);
                }
            }
            BhvInput::VirtualFence(descriptor) => {
                let cmd = FenceCmd::parse(&descriptor)?;
                info!("Virtual fence set to {:?}", cmd);
                self.ctrl.set_virtual_fence(cmd.fence());
            }
            BhvInput::Waypoint(wp) => {
                self.ds.arbiter.handle_waypoint(
                    &wp,
                    &self.ds.pose_odom,
                    &mut self.ctrl,
                    &mut self.ds.outbox,
                );
            }
        }

        Ok(())
    }

    /// Handle a message from the swarm.
    pub fn handle_swarm(&mut self, msg: &SwarmMsg) {
        self.ds.boot.handle(msg, &mut self.ds.outbox);
    }

    /// Run a single cycle.
    pub fn tick(&mut self, clock: Clock, tf: &dyn FrameTransform) {
        self.ds.cycle_start(clock.elapsed_s);

        if self.ds.is_status_cycle {
            self.ds
                .outbox
                .push(BhvOutput::Status(ONLINE_STATUS.to_string()));
        }
        if self.ds.is_heartbeat_cycle {
            self.ds.outbox.push(BhvOutput::Heartbeat);
        }

        if !self.ds.initialised {
            if clock.elapsed_s > self.ds.params.start_delay_s {
                self.init(clock);
            } else {
                self.ds.cycle_end();
                return;
            }
        }

        self.ds.run_time.update(clock.now_ms);
        if self.ds.is_status_cycle {
            trace!("Running for {}", self.ds.run_time);
        }

        self.ds.boot.tick(clock.elapsed_s, &mut self.ds.outbox);

        self.correct_drift(tf);

        self.ctrl.set_current_time(clock.now_ms);
        self.ctrl.set_center_location_odom(self.ds.center_odom);

        let decision = self.ctrl.do_work();
        self.ds
            .arbiter
            .dispatch(&decision, &mut self.ctrl, &mut self.ds.outbox);

        // Publish the state string only on change
        let state = self.ds.arbiter.mode().status_str();
        if self.ds.prev_state.as_deref() != Some(state) {
            self.ds
                .outbox
                .push(BhvOutput::StateMachine(state.to_string()));
            self.ds.prev_state = Some(state.to_string());
        }

        self.ds.cycle_end();
    }

    /// Seed the center estimates, called once when the start delay has passed.
    fn init(&mut self, clock: Clock) {
        let standoff_m = self.ds.params.standoff_m;

        self.ds.center_odom = center::seed(&self.ds.pose_odom, standoff_m);
        self.ctrl.set_center_location_odom(self.ds.center_odom);

        let center_map = center::seed(&self.ds.pose_map, standoff_m);
        self.ctrl.set_center_location_map(center_map);

        self.ds.outbox.info_log("Averaging center location");
        self.ds.center_map = self.ds.center_avg.record(&center_map);
        self.ctrl
            .set_averaged_center_location_map(self.ds.center_map);

        self.ds.run_time.start(clock.now_ms);
        self.ds.initialised = true;

        info!(
            "Center initialised at {:?} (odom), {:?} (map)",
            self.ds.center_odom, self.ds.center_map
        );
    }

    fn correct_drift(&mut self, tf: &dyn FrameTransform) {
        match self
            .ds
            .drift
            .correct(&mut self.ds.center_odom, &self.ds.center_map, tf)
        {
            Ok(outcome) => {
                if self.ds.num_consec_tf_failures > 0 {
                    info!(
                        "Center transform recovered after {} cycles",
                        self.ds.num_consec_tf_failures
                    );
                    self.ds.num_consec_tf_failures = 0;
                }

                if let DriftOutcome::Corrected { distance_m } = outcome {
                    debug!(
                        "Center drifted by {:.03} m, corrected to {:?}",
                        distance_m, self.ds.center_odom
                    );
                }
            }
            Err(e) => {
                self.ds.num_consec_tf_failures += 1;

                // Only the first failure in a run is reported to the operator
                if self.ds.num_consec_tf_failures == 1 {
                    warn!("Could not transform the center into the odom frame: {}", e);
                    self.ds
                        .outbox
                        .push(BhvOutput::InfoLog(format!("Center transform failed: {}", e)));
                } else {
                    trace!("Center transform failed: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        controller::Decision,
        testing::{FixedTf, NoTf, RecordingController},
    };
    use chrono::Utc;
    use comms_if::bhv::{
        DriveCmd, JoyMsg, OdomMsg, Pose2D, RangeMsg, SonarId, TagDetection, WaypointAction,
        WaypointMsg,
    };

    const T0_MS: i64 = 1_600_000_000_000;

    fn new_loop() -> BhvLoop<RecordingController> {
        let mut bl = BhvLoop::new("achilles", BhvParams::default(), RecordingController::default());
        bl.take_outbox();
        bl
    }

    fn clock(elapsed_s: f64) -> Clock {
        Clock {
            elapsed_s,
            now_ms: T0_MS + (elapsed_s * 1000.0) as i64,
        }
    }

    /// Tick the loop from `from_s` up to but not including `to_s`.
    fn run(bl: &mut BhvLoop<RecordingController>, from_s: f64, to_s: f64, tf: &dyn FrameTransform) {
        let mut cycle = 0;
        loop {
            let t = from_s + cycle as f64 * 0.1;
            if t >= to_s {
                break;
            }
            bl.tick(clock(t), tf);
            cycle += 1;
        }
    }

    fn odom(x: f64, y: f64) -> OdomMsg {
        OdomMsg {
            stamp: Utc::now(),
            position_m: [x, y, 0.0],
            attitude_q: [0.0, 0.0, 0.0, 1.0],
            linear_vel_ms: 0.1,
            angular_vel_rads: 0.0,
        }
    }

    fn drives(outbox: &Outbox) -> Vec<DriveCmd> {
        outbox
            .bhv
            .iter()
            .filter_map(|m| match m {
                BhvOutput::DriveControl(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_startup_logs() {
        let mut bl = BhvLoop::new("achilles", BhvParams::default(), RecordingController::default());

        assert_eq!(
            bl.take_outbox().bhv,
            vec![
                BhvOutput::InfoLog("Log Started".into()),
                BhvOutput::InfoLog("Start delay is 30.0 seconds".into())
            ]
        );
    }

    #[test]
    fn test_start_delay_gating() {
        let mut bl = new_loop();

        run(&mut bl, 0.0, 29.95, &FixedTf { dx: 0.0, dy: 0.0 });

        assert!(!bl.ds.initialised);
        assert_eq!(bl.ctrl.num_do_work, 0);
        assert!(bl.ctrl.center_odom.is_empty());

        // Only the periodic status and heartbeat are published during the delay
        let out = bl.take_outbox();
        assert!(out.swarm.is_empty());
        assert_eq!(
            out.bhv
                .iter()
                .filter(|m| **m == BhvOutput::Status(ONLINE_STATUS.into()))
                .count(),
            30
        );
        assert_eq!(
            out.bhv.iter().filter(|m| **m == BhvOutput::Heartbeat).count(),
            15
        );
        assert_eq!(out.bhv.len(), 45);

        // The first tick past the delay initialises the loop
        bl.tick(clock(30.05), &FixedTf { dx: 0.0, dy: 0.0 });
        assert!(bl.ds.initialised);
        assert_eq!(bl.ctrl.num_do_work, 1);
    }

    #[test]
    fn test_center_seeding() -> Result<(), InputError> {
        let mut bl = new_loop();

        bl.handle_input(BhvInput::Odometry(odom(1.0, 0.0)))?;
        bl.handle_input(BhvInput::MapOdometry(odom(11.0, 5.0)))?;

        bl.tick(clock(30.5), &FixedTf { dx: 10.0, dy: 5.0 });

        assert!((bl.ds.center_odom.x - 2.3).abs() < 1e-9);
        assert!(bl.ds.center_odom.y.abs() < 1e-9);
        assert!((bl.ds.center_map.x - 12.3).abs() < 1e-9);
        assert!((bl.ds.center_map.y - 5.0).abs() < 1e-9);
        assert_eq!(bl.ctrl.averaged_center_map, vec![bl.ds.center_map]);
        assert_eq!(bl.ds.center_avg.count(), 1);

        Ok(())
    }

    #[test]
    fn test_drift_correction_steps() -> Result<(), InputError> {
        let mut bl = new_loop();

        bl.handle_input(BhvInput::Odometry(odom(0.0, 0.0)))?;
        bl.handle_input(BhvInput::MapOdometry(odom(0.0, 0.0)))?;

        // The map frame has drifted 3 m along x from odom
        let tf = FixedTf { dx: -3.0, dy: 0.0 };

        bl.tick(clock(30.1), &tf);
        assert!((bl.ds.center_odom.x - 2.3).abs() < 1e-9);

        bl.tick(clock(30.2), &tf);
        assert!((bl.ds.center_odom.x - 3.3).abs() < 1e-9);

        bl.tick(clock(30.3), &tf);
        assert!((bl.ds.center_odom.x - 4.3).abs() < 1e-9);

        // Within tolerance of the reference (4.3 m), no more steps
        bl.tick(clock(30.4), &tf);
        assert!((bl.ds.center_odom.x - 4.3).abs() < 1e-9);

        // The controller sees every corrected value
        assert_eq!(bl.ctrl.center_odom.len(), 5);

        Ok(())
    }

    #[test]
    fn test_tf_failure_is_soft() {
        let mut bl = new_loop();

        bl.tick(clock(30.1), &NoTf);
        let center = bl.ds.center_odom;

        for i in 0..5 {
            bl.tick(clock(30.2 + i as f64 * 0.1), &NoTf);
        }

        assert_eq!(bl.ds.center_odom, center);
        assert_eq!(bl.ds.num_consec_tf_failures, 6);
        assert_eq!(bl.ctrl.num_do_work, 6);

        let failures = bl
            .take_outbox()
            .bhv
            .iter()
            .filter(|m| matches!(m, BhvOutput::InfoLog(s) if s.starts_with("Center transform failed")))
            .count();
        assert_eq!(failures, 1);
    }

    #[test]
    fn test_mode_change_zeroes_drive() -> Result<(), InputError> {
        let mut bl = new_loop();
        let tf = FixedTf { dx: 0.0, dy: 0.0 };

        bl.handle_input(BhvInput::Mode(2))?;
        bl.ctrl.decisions.push_back(Decision::drive(0.4, 0.4));
        bl.tick(clock(30.1), &tf);

        bl.handle_input(BhvInput::Mode(0))?;

        let out = bl.take_outbox();
        assert_eq!(
            drives(&out),
            vec![DriveCmd::STOP, DriveCmd::new(0.4, 0.4), DriveCmd::STOP]
        );
        assert_eq!(bl.ctrl.modes, vec![Mode::Autonomous, Mode::Manual]);

        Ok(())
    }

    #[test]
    fn test_status_edge_triggered() -> Result<(), InputError> {
        let mut bl = new_loop();
        let tf = FixedTf { dx: 0.0, dy: 0.0 };

        let states = |out: &Outbox| -> Vec<String> {
            out.bhv
                .iter()
                .filter_map(|m| match m {
                    BhvOutput::StateMachine(s) => Some(s.clone()),
                    _ => None,
                })
                .collect()
        };

        bl.tick(clock(30.1), &tf);
        bl.tick(clock(30.2), &tf);
        assert_eq!(states(&bl.take_outbox()), vec!["WAITING".to_string()]);

        bl.handle_input(BhvInput::Mode(3))?;
        bl.tick(clock(30.3), &tf);
        bl.tick(clock(30.4), &tf);
        assert_eq!(states(&bl.take_outbox()), vec!["AUTONOMOUS".to_string()]);

        Ok(())
    }

    #[test]
    fn test_joystick_manual_only() -> Result<(), InputError> {
        let mut bl = new_loop();
        let joy = JoyMsg {
            axes: vec![0.0, 0.0, 0.0, 0.0, 1.0],
        };

        bl.handle_input(BhvInput::Joystick(joy.clone()))?;
        assert_eq!(drives(&bl.take_outbox()), vec![DriveCmd::new(255.0, 255.0)]);

        assert_eq!(
            bl.handle_input(BhvInput::Joystick(JoyMsg { axes: vec![0.0] })),
            Err(InputError::Joystick(JoyError::TooFewAxes {
                expected: 5,
                found: 1
            }))
        );

        bl.handle_input(BhvInput::Mode(2))?;
        bl.take_outbox();
        bl.handle_input(BhvInput::Joystick(joy))?;
        assert!(bl.take_outbox().is_empty());

        Ok(())
    }

    #[test]
    fn test_tags_autonomous_only() -> Result<(), InputError> {
        let mut bl = new_loop();
        let tag = TagDetection {
            id: 0,
            position_m: [0.1, 0.0, 0.3],
            orientation_q: [0.0, 0.0, 0.0, 1.0],
        };

        bl.handle_input(BhvInput::Targets(vec![tag]))?;
        assert!(bl.ctrl.tags.is_empty());

        bl.handle_input(BhvInput::Mode(2))?;
        bl.handle_input(BhvInput::Targets(vec![]))?;
        bl.handle_input(BhvInput::Targets(vec![tag]))?;
        assert_eq!(bl.ctrl.tags, vec![vec![tag]]);

        Ok(())
    }

    #[test]
    fn test_sonar_and_fence() {
        let mut bl = new_loop();
        let now = Utc::now();

        for (sonar, range_m) in [(SonarId::Left, 1.0), (SonarId::Center, 2.0), (SonarId::Right, 3.0)]
            .iter()
        {
            assert_eq!(
                bl.handle_input(BhvInput::Sonar(RangeMsg {
                    stamp: now,
                    sonar: *sonar,
                    range_m: *range_m
                })),
                Ok(())
            );
        }
        assert_eq!(bl.ctrl.sonar, vec![(1.0, 2.0, 3.0)]);

        assert_eq!(bl.handle_input(BhvInput::VirtualFence(vec![1.0, 0.0, 0.0, 5.0])), Ok(()));
        assert!(matches!(
            bl.handle_input(BhvInput::VirtualFence(vec![1.0, 0.0, 0.0])),
            Err(InputError::Fence(FenceError::InvalidParamCount { .. }))
        ));
        assert_eq!(bl.handle_input(BhvInput::VirtualFence(vec![0.0])), Ok(()));

        // The rejected fence never reaches the controller
        assert_eq!(bl.ctrl.fences.len(), 2);
        assert_eq!(bl.ctrl.fences[1], None);
    }

    #[test]
    fn test_waypoint_lifecycle() -> Result<(), InputError> {
        let mut bl = new_loop();
        let tf = FixedTf { dx: 0.0, dy: 0.0 };

        bl.handle_input(BhvInput::Odometry(odom(1.0, 1.0)))?;
        bl.handle_input(BhvInput::Mode(2))?;
        bl.handle_input(BhvInput::Waypoint(WaypointMsg {
            id: 5,
            action: WaypointAction::Add,
            x: 1.0,
            y: 1.0,
        }))?;
        assert_eq!(bl.mode(), Mode::Manual);
        assert_eq!(bl.ctrl.waypoints, vec![(5, Pose2D::new(1.0, 1.0, 0.0))]);

        bl.handle_input(BhvInput::Waypoint(WaypointMsg {
            id: 5,
            action: WaypointAction::Remove,
            x: 0.0,
            y: 0.0,
        }))?;

        run(&mut bl, 30.1, 32.0, &tf);

        let reached = bl
            .take_outbox()
            .bhv
            .iter()
            .filter(|m| matches!(m, BhvOutput::WaypointFeedback(_)))
            .count();
        assert_eq!(reached, 0);
        assert!(bl.ctrl.waypoints.is_empty());

        Ok(())
    }

    #[test]
    fn test_swarm_broadcasts() {
        let mut bl = new_loop();
        let tf = FixedTf { dx: 0.0, dy: 0.0 };

        run(&mut bl, 30.1, 40.0, &tf);

        assert_eq!(
            bl.take_outbox().swarm,
            vec![SwarmMsg::Boot, SwarmMsg::Identity("achilles".into())]
        );

        // Our own boot comes back from the forwarder and is counted
        bl.handle_swarm(&SwarmMsg::Boot);
        assert_eq!(bl.ds.boot.boot_count(), 1);
    }
}
