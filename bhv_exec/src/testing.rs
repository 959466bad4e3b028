//! Test doubles shared between the module tests

use std::collections::VecDeque;

use comms_if::bhv::{Pose2D, TagDetection};

use crate::{
    arbiter::Mode,
    controller::{Controller, Decision},
    fence::Fence,
    frame_tf::{Frame, FrameTransform, TfError},
};

/// Controller which records everything it's given and replays queued decisions.
#[derive(Debug, Default)]
pub struct RecordingController {
    pub times_ms: Vec<i64>,
    pub modes: Vec<Mode>,
    pub center_odom: Vec<Pose2D>,
    pub center_map: Vec<Pose2D>,
    pub averaged_center_map: Vec<Pose2D>,
    pub positions: Vec<Pose2D>,
    pub velocities: Vec<(f64, f64)>,
    pub map_positions: Vec<Pose2D>,
    pub map_velocities: Vec<(f64, f64)>,
    pub sonar: Vec<(f32, f32, f32)>,
    pub tags: Vec<Vec<TagDetection>>,
    pub fences: Vec<Option<Fence>>,
    pub waypoints: Vec<(i32, Pose2D)>,

    /// Waypoint IDs returned by the next `cleared_waypoints()` call
    pub cleared: Vec<i32>,

    /// Decisions returned by `do_work()`, wait once empty
    pub decisions: VecDeque<Decision>,

    pub num_do_work: usize,
}

impl Controller for RecordingController {
    fn set_current_time(&mut self, time_ms: i64) {
        self.times_ms.push(time_ms);
    }

    fn set_center_location_odom(&mut self, center: Pose2D) {
        self.center_odom.push(center);
    }

    fn set_center_location_map(&mut self, center: Pose2D) {
        self.center_map.push(center);
    }

    fn set_averaged_center_location_map(&mut self, center: Pose2D) {
        self.averaged_center_map.push(center);
    }

    fn set_position_data(&mut self, pose: Pose2D) {
        self.positions.push(pose);
    }

    fn set_velocity_data(&mut self, linear_ms: f64, angular_rads: f64) {
        self.velocities.push((linear_ms, angular_rads));
    }

    fn set_map_position_data(&mut self, pose: Pose2D) {
        self.map_positions.push(pose);
    }

    fn set_map_velocity_data(&mut self, linear_ms: f64, angular_rads: f64) {
        self.map_velocities.push((linear_ms, angular_rads));
    }

    fn set_sonar_data(&mut self, left: f32, center: f32, right: f32) {
        self.sonar.push((left, center, right));
    }

    fn set_april_tags(&mut self, tags: &[TagDetection]) {
        self.tags.push(tags.to_vec());
    }

    fn set_mode(&mut self, mode: Mode) {
        self.modes.push(mode);
    }

    fn set_virtual_fence(&mut self, fence: Option<Fence>) {
        self.fences.push(fence);
    }

    fn add_manual_waypoint(&mut self, location: Pose2D, id: i32) {
        self.waypoints.push((id, location));
    }

    fn remove_manual_waypoint(&mut self, id: i32) {
        self.waypoints.retain(|(i, _)| *i != id);
    }

    fn cleared_waypoints(&mut self) -> Vec<i32> {
        std::mem::take(&mut self.cleared)
    }

    fn do_work(&mut self) -> Decision {
        self.num_do_work += 1;
        self.decisions.pop_front().unwrap_or_else(Decision::wait)
    }
}

/// Transform where the map and odom frames differ by a fixed translation.
pub struct FixedTf {
    pub dx: f64,
    pub dy: f64,
}

impl FrameTransform for FixedTf {
    fn transform_pose(
        &self,
        pose: Pose2D,
        from: Frame,
        to: Frame,
        _timeout_s: f64,
    ) -> Result<Pose2D, TfError> {
        match (from, to) {
            (Frame::Map, Frame::Odom) => Ok(Pose2D::new(pose.x - self.dx, pose.y - self.dy, pose.theta)),
            (Frame::Odom, Frame::Map) => Ok(Pose2D::new(pose.x + self.dx, pose.y + self.dy, pose.theta)),
            _ => Ok(pose),
        }
    }
}

/// Transform which is never available.
pub struct NoTf;

impl FrameTransform for NoTf {
    fn transform_pose(
        &self,
        _pose: Pose2D,
        _from: Frame,
        _to: Frame,
        _timeout_s: f64,
    ) -> Result<Pose2D, TfError> {
        Err(TfError::NoData(Frame::Map))
    }
}
