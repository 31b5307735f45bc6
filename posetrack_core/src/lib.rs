// posetrack_core/src/lib.rs

// This file defines the public modules of the tracking core.
pub mod blender;
pub mod channels;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extrapolation;
pub mod hemisphere;
pub mod history;
pub mod predictor;
pub mod prelude;
pub mod types;
