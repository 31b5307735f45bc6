// posetrack_core/src/types.rs

use nalgebra::{Isometry3, Quaternion, Vector3};

// --- Core Type Aliases ---
pub type Position = Vector3<f64>;
/// A rotation quaternion `(w, x, y, z)`. Not assumed to be unit length or in
/// any particular hemisphere until it has been through `hemisphere`.
pub type Orientation = Quaternion<f64>;
/// The fixed transform between the tracked point and the reported anchor.
pub type MountingTransform = Isometry3<f64>;

/// One raw measurement as delivered by the external tracking source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub position: Position,
    pub orientation: Orientation,
    /// When the sample was captured, relative to its delivery.
    /// Negative values are in the past (e.g. `-0.03` for 30 ms of latency).
    pub capture_time_offset: f64,
}

impl RawSample {
    pub fn new(position: Position, orientation: Orientation, capture_time_offset: f64) -> Self {
        Self {
            position,
            orientation,
            capture_time_offset,
        }
    }

    /// How long ago the sample was captured. Future-stamped samples count as "now".
    pub fn age(&self) -> f64 {
        (-self.capture_time_offset).max(0.0)
    }
}

/// A measurement held in the sample history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    /// Seconds since capture, relative to the history's last ageing step.
    /// Grows every time the history is aged.
    pub age: f64,
    pub position: Position,
    pub orientation: Orientation,
}

/// A position and orientation without any derived quantities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPose {
    pub position: Position,
    pub orientation: Orientation,
}

impl Default for TrackedPose {
    fn default() -> Self {
        Self {
            position: Position::zeros(),
            orientation: Orientation::identity(),
        }
    }
}

/// The fully computed pose for one output frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePose {
    pub position: Position,
    /// Always unit length.
    pub orientation: Orientation,
    /// Exponentially filtered linear velocity in m/s.
    pub velocity: Vector3<f64>,
    /// Offset in seconds between the instant this pose describes and the
    /// instant it was requested for. Zero unless the horizon clamp applied.
    pub time_offset: f64,
    /// The device's mounting transform, carried alongside the pose.
    pub mounting: MountingTransform,
}

impl Default for FramePose {
    fn default() -> Self {
        Self {
            position: Position::zeros(),
            orientation: Orientation::identity(),
            velocity: Vector3::zeros(),
            time_offset: 0.0,
            mounting: MountingTransform::identity(),
        }
    }
}
