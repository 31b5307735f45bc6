// posetrack_driver/src/device/controller.rs

use std::any::Any;

use nalgebra::Isometry3;
use posetrack_core::config::ExtrapolationConfig;
use posetrack_core::predictor::PosePredictor;
use posetrack_core::types::MountingTransform;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{DeviceKind, TrackedDevice};
use crate::session::SessionContext;
use crate::sink::DriverPose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Any,
}

/// A handheld controller.
#[derive(Debug, Clone)]
pub struct ControllerDevice {
    serial: String,
    handedness: Handedness,
    device_index: Option<u32>,
    predictor: PosePredictor,
    last_pose: Option<DriverPose>,
}

impl ControllerDevice {
    pub fn new(
        serial: impl Into<String>,
        handedness: Handedness,
        config: ExtrapolationConfig,
        mounting: MountingTransform,
    ) -> Self {
        Self {
            serial: serial.into(),
            handedness,
            device_index: None,
            predictor: PosePredictor::new(config, mounting),
            last_pose: None,
        }
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    /// Makes the controller's current orientation the reference "forward" by
    /// setting the mounting rotation to its inverse. The mounting translation
    /// is kept. Returns `false` if nothing has been published yet.
    pub fn recalibrate(&mut self) -> bool {
        let Some(pose) = &self.last_pose else {
            return false;
        };
        let mounting = Isometry3::from_parts(
            self.predictor.mounting().translation,
            pose.orientation.inverse(),
        );
        info!("Recalibrating controller {} orientation", self.serial);
        self.predictor.set_mounting(mounting);
        true
    }
}

impl TrackedDevice for ControllerDevice {
    fn serial(&self) -> &str {
        &self.serial
    }

    fn kind(&self) -> DeviceKind {
        DeviceKind::Controller
    }

    fn device_index(&self) -> Option<u32> {
        self.device_index
    }

    fn activate(&mut self, device_index: u32) {
        info!("Activating controller {} ({:?})", self.serial, self.handedness);
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
        let pose = DriverPose::from_frame(&frame, session.height_offset());
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
