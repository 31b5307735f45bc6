// posetrack_driver/src/device/hmd.rs

use std::any::Any;

use nalgebra::UnitQuaternion;
use posetrack_core::config::ExtrapolationConfig;
use posetrack_core::predictor::PosePredictor;
use posetrack_core::types::MountingTransform;
use tracing::{debug, info};

use super::{DeviceKind, TrackedDevice};
use crate::session::SessionContext;
use crate::sink::DriverPose;

/// The head-mounted unit.
#[derive(Debug, Clone)]
pub struct HmdDevice {
    serial: String,
    device_index: Option<u32>,
    predictor: PosePredictor,
    /// Orientation latched when the session's view lock engaged.
    locked_orientation: Option<UnitQuaternion<f64>>,
    last_pose: Option<DriverPose>,
}

impl HmdDevice {
    pub fn new(serial: impl Into<String>, config: ExtrapolationConfig, mounting: MountingTransform) -> Self {
        Self {
            serial: serial.into(),
            device_index: None,
            predictor: PosePredictor::new(config, mounting),
            locked_orientation: None,
            last_pose: None,
        }
    }

    pub fn is_view_locked(&self) -> bool {
        self.locked_orientation.is_some()
    }
}

impl TrackedDevice for HmdDevice {
    fn serial(&self) -> &str {
        &self.serial
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::Hmd
    }

    fn device_index(&self) -> Option<u32> {
        self.device_index
    }

    fn activate(&mut self, device_index: u32) {
        info!("Activating HMD {}", self.serial);
        self.device_index = Some(device_index);
    }

    fn deactivate(&mut self) {
        self.device_index = None;
    }

    fn predictor(&self) -> &PosePredictor {
        &self.predictor
    }

    fn predictor_mut(&mut self) -> &mut PosePredictor {
        &mut self.predictor
    }

    fn update(&mut self, session: &SessionContext, now: f64) -> Option<DriverPose> {
        self.device_index?;
        let frame = self.predictor.tick(now)?;
        let mut pose = DriverPose::from_frame(&frame, session.height_offset());

        // Position keeps tracking while the view is locked; only the
        // orientation is frozen.
        if session.view_lock_requested() {
            pose.orientation = *self.locked_orientation.get_or_insert_with(|| {
                debug!("Latching view lock orientation");
                pose.orientation
            });
        } else {
            self.locked_orientation = None;
        }

        self.last_pose = Some(pose);
        Some(pose)
    }

    fn last_pose(&self) -> Option<&DriverPose> {
        self.last_pose.as_ref()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
