// posetrack_driver/src/device/mod.rs

use std::any::Any;

use posetrack_core::diagnostics::DiagnosticSink;
use posetrack_core::predictor::{IngestOutcome, PosePredictor};
use posetrack_core::types::RawSample;

use crate::session::SessionContext;
use crate::sink::DriverPose;

pub mod controller;
pub mod hmd;

pub use controller::{ControllerDevice, Handedness};
pub use hmd::HmdDevice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Hmd,
    Controller,
}

/// The contract for every tracked device the driver exposes.
///
/// Each device owns its own `PosePredictor`; the only state devices share is
/// the `SessionContext` passed into `update`.
pub trait TrackedDevice: Send {
    fn serial(&self) -> &str;

    fn kind(&self) -> DeviceKind;

    /// The host-assigned index, `None` while the device is not active.
    fn device_index(&self) -> Option<u32>;

    fn activate(&mut self, device_index: u32);

    fn deactivate(&mut self);

    fn predictor(&self) -> &PosePredictor;

    fn predictor_mut(&mut self) -> &mut PosePredictor;

    /// Computes this frame's pose. `None` means "publish nothing this frame".
    fn update(&mut self, session: &SessionContext, now: f64) -> Option<DriverPose>;

    /// The pose returned by the last successful `update`.
    fn last_pose(&self) -> Option<&DriverPose>;

    /// Allows for dynamic downcasting to access device-specific methods.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Hands a raw sample to the predictor. Inactive devices ignore samples.
    fn ingest_sample(
        &mut self,
        sample: &RawSample,
        now: f64,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Option<IngestOutcome> {
        self.device_index()?;
        Some(self.predictor_mut().ingest_sample(sample, now, diagnostics))
    }
}
