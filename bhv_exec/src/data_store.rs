//! # Data Store
//!
//! All state owned by the behaviour loop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::bhv::Pose2D;

use crate::{
    arbiter::Arbiter,
    bhv_loop::RunTime,
    boot::BootCoordinator,
    center::{CenterAvgFilter, DriftCorrector},
    outbox::Outbox,
    params::BhvParams,
    sonar_sync::SonarSync,
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Debug, Clone)]
pub struct DataStore {
    pub params: BhvParams,

    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if the "online" status is due this cycle
    pub is_status_cycle: bool,

    /// True if a heartbeat is due this cycle
    pub is_heartbeat_cycle: bool,

    /// Seconds since the session started, as of the start of this cycle
    pub elapsed_s: f64,

    /// Set once the start delay has passed and the center has been seeded
    pub initialised: bool,

    pub run_time: RunTime,

    // Rover pose
    /// Latest pose in the odometry frame
    pub pose_odom: Pose2D,

    /// Latest pose in the map frame
    pub pose_map: Pose2D,

    // Center estimate
    pub center_odom: Pose2D,
    pub center_map: Pose2D,
    pub center_avg: CenterAvgFilter,
    pub drift: DriftCorrector,

    // Swarm
    pub boot: BootCoordinator,

    // Actuation
    pub arbiter: Arbiter,

    /// Last state machine string published
    pub prev_state: Option<String>,

    pub sonar_sync: SonarSync,

    pub outbox: Outbox,

    // Monitoring counters
    /// Number of consecutive cycles in which the center couldn't be transformed
    pub num_consec_tf_failures: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DataStore {
    pub fn new(name: &str, params: BhvParams) -> Self {
        Self {
            num_cycles: 0,
            is_status_cycle: false,
            is_heartbeat_cycle: false,
            elapsed_s: 0.0,
            initialised: false,
            run_time: RunTime::default(),
            pose_odom: Pose2D::default(),
            pose_map: Pose2D::default(),
            center_odom: Pose2D::default(),
            center_map: Pose2D::default(),
            center_avg: CenterAvgFilter::new(params.center_avg_capacity),
            drift: DriftCorrector::new(params.drift_tolerance_m, params.tf_timeout_s),
            boot: BootCoordinator::new(name, &params),
            arbiter: Arbiter::default(),
            prev_state: None,
            sonar_sync: SonarSync::new(params.sonar_sync_window_s, params.sonar_queue_size),
            outbox: Outbox::default(),
            num_consec_tf_failures: 0,
            params,
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Sets the periodic publication flags and the cycle's elapsed time.
    pub fn cycle_start(&mut self, elapsed_s: f64) {
        let status_cycles = self.params.interval_cycles(self.params.status_interval_s);
        let heartbeat_cycles = self.params.interval_cycles(self.params.heartbeat_interval_s);

        self.is_status_cycle = self.num_cycles % status_cycles == 0;
        self.is_heartbeat_cycle = self.num_cycles % heartbeat_cycles == 0;

        self.elapsed_s = elapsed_s;
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}
