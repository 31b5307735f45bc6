// posetrack_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::diagnostics::{DiagnosticSink, RecordingDiagnostics, TracingDiagnostics};
pub use crate::error::{OutlierReason, TrackingError};

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::channels::PoseChannel;
pub use crate::config::ExtrapolationConfig;
pub use crate::types::{
    FramePose, MountingTransform, Orientation, PoseSample, Position, RawSample, TrackedPose,
};

// --- Prediction Pipeline ---
pub use crate::blender::PoseBlender;
pub use crate::extrapolation::{Prediction, PredictionStatus, TrendExtrapolator};
pub use crate::history::{InsertOutcome, SampleHistory};
pub use crate::predictor::{IngestOutcome, PosePredictor};
