// posetrack_driver/src/lib.rs

// Host-facing layer: devices, the driver loop, settings and the replay tool.
pub mod cli;
pub mod clock;
pub mod device;
pub mod driver;
pub mod mounting;
pub mod prelude;
pub mod replay;
pub mod session;
pub mod settings;
pub mod sink;
