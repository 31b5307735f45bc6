// posetrack_driver/src/sink.rs

use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use posetrack_core::types::FramePose;

/// The pose handed to the host runtime once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverPose {
    /// Position in the tracking space, including the session height offset.
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub velocity: Vector3<f64>,
    /// Seconds between the instant this pose describes and the frame it is
    /// published for (negative when the pose lags behind).
    pub time_offset: f64,
    /// Transform from the tracked point to the reported anchor.
    pub driver_from_head: Isometry3<f64>,
    pub pose_is_valid: bool,
    pub device_is_connected: bool,
}

impl DriverPose {
    /// Builds the host-facing pose from a computed frame, lifted by `height_offset`.
    pub fn from_frame(frame: &FramePose, height_offset: f64) -> Self {
        Self {
            position: frame.position + Vector3::new(0.0, height_offset, 0.0),
            orientation: UnitQuaternion::from_quaternion(frame.orientation),
            velocity: frame.velocity,
            time_offset: frame.time_offset,
            driver_from_head: frame.mounting,
            pose_is_valid: true,
            device_is_connected: true,
        }
    }
}

/// The contract for whatever delivers poses to the host runtime.
/// Called at most once per device per frame, always with a complete pose.
pub trait PoseSink {
    fn pose_updated(&mut self, device_index: u32, pose: &DriverPose);
}

/// Keeps every published pose, in publish order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub published: Vec<(u32, DriverPose)>,
}

impl RecordingSink {
    pub fn poses_for(&self, device_index: u32) -> impl Iterator<Item = &DriverPose> + '_ {
        self.published
            .iter()
            .filter(move |(index, _)| *index == device_index)
            .map(|(_, pose)| pose)
    }

    pub fn last_for(&self, device_index: u32) -> Option<&DriverPose> {
        self.poses_for(device_index).last()
    }
}

impl PoseSink for RecordingSink {
    fn pose_updated(&mut self, device_index: u32, pose: &DriverPose) {
        self.published.push((device_index, *pose));
    }
}
