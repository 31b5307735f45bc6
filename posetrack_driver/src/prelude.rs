// posetrack_driver/src/prelude.rs

pub use posetrack_core::prelude::*;

// --- Host Contracts ---
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::device::{DeviceKind, TrackedDevice};
pub use crate::sink::{DriverPose, PoseSink, RecordingSink};

// --- Devices and Session ---
pub use crate::device::{ControllerDevice, Handedness, HmdDevice};
pub use crate::driver::Driver;
pub use crate::mounting::MountingSettings;
pub use crate::session::SessionContext;

// --- Configuration ---
pub use crate::settings::{ControllerSettings, DriverSettings, HmdSettings, SettingsError};
