//! # Behaviour Executable Parameters
//!
//! This module provides parameters for the behaviour executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the behaviour executable.
///
/// Any field missing from the parameter file takes it's default value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BhvParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Time after startup at which the center estimate is seeded and the controller starts being
    /// consulted.
    ///
    /// Units: seconds
    pub start_delay_s: f64,

    /// Elapsed time after which this rover sends it's boot broadcast.
    ///
    /// Units: seconds
    pub boot_broadcast_s: f64,

    /// Elapsed time after which this rover sends it's identity broadcast.
    ///
    /// Units: seconds
    pub identity_broadcast_s: f64,

    /// Distance ahead of the rover at which the center is placed at startup.
    ///
    /// Units: meters
    pub standoff_m: f64,

    /// Distance between the odometry center and the transformed map center above which the
    /// odometry center is corrected.
    ///
    /// Units: meters
    pub drift_tolerance_m: f64,

    /// Maximum difference in age between the poses used to build the map to odometry transform.
    ///
    /// Units: seconds
    pub tf_timeout_s: f64,

    /// Interval between "online" status publications.
    ///
    /// Units: seconds
    pub status_interval_s: f64,

    /// Interval between heartbeat publications.
    ///
    /// Units: seconds
    pub heartbeat_interval_s: f64,

    /// Maximum spread in stamps between sonar readings which are fused together.
    ///
    /// Units: seconds
    pub sonar_sync_window_s: f64,

    /// Number of unmatched readings held for each sonar.
    pub sonar_queue_size: usize,

    /// Magnitude of the largest motor command produced from the joystick.
    pub joy_max_motor_cmd: f64,

    /// Joystick axis values with a magnitude below this are treated as zero.
    pub joy_deadzone: f32,

    /// Index of the joystick axis used for forward speed.
    pub joy_linear_axis: usize,

    /// Index of the joystick axis used for turn rate.
    pub joy_angular_axis: usize,

    /// Largest swarm for which individual boot counts are reported.
    pub max_swarm_size: u32,

    /// Number of center fixes averaged together.
    pub center_avg_capacity: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BhvParams {
    /// Number of cycles between two events that happen every `interval_s` seconds, never less
    /// than one.
    pub fn interval_cycles(&self, interval_s: f64) -> u128 {
        let cycles = (interval_s / self.cycle_period_s).round();

        if cycles < 1.0 {
            1
        } else {
            cycles as u128
        }
    }
}

impl Default for BhvParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.1,
            start_delay_s: 30.0,
            boot_broadcast_s: 31.0,
            identity_broadcast_s: 33.0,
            standoff_m: 1.3,
            drift_tolerance_m: 0.5,
            tf_timeout_s: 1.0,
            status_interval_s: 1.0,
            heartbeat_interval_s: 2.0,
            sonar_sync_window_s: 0.1,
            sonar_queue_size: 10,
            joy_max_motor_cmd: 255.0,
            joy_deadzone: 0.1,
            joy_linear_axis: 4,
            joy_angular_axis: 3,
            max_swarm_size: 6,
            center_avg_capacity: 20,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_file() -> Result<(), util::params::LoadError> {
        let p: BhvParams = util::params::from_str("start_delay_s = 5.0\nstandoff_m = 2.0")?;

        assert_eq!(p.start_delay_s, 5.0);
        assert_eq!(p.standoff_m, 2.0);
        assert_eq!(p.drift_tolerance_m, 0.5);
        assert_eq!(p.center_avg_capacity, 20);

        Ok(())
    }

    #[test]
    fn test_interval_cycles() {
        let p = BhvParams::default();

        assert_eq!(p.interval_cycles(p.status_interval_s), 10);
        assert_eq!(p.interval_cycles(p.heartbeat_interval_s), 20);
        assert_eq!(p.interval_cycles(0.01), 1);
    }
}
