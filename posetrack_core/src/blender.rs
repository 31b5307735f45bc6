// posetrack_core/src/blender.rs

use nalgebra::Vector3;

use crate::extrapolation::Prediction;
use crate::hemisphere;
use crate::types::{FramePose, MountingTransform, Orientation};

/// Weight of the previous velocity in the velocity filter.
pub const VELOCITY_RETENTION: f64 = 0.8;

/// Combines a fresh trend prediction with the previously published pose.
///
/// The smoothing factor weights the *old* pose: near 0 the output snaps to
/// the prediction, near 1 it barely moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseBlender {
    smoothing: f64,
}

impl PoseBlender {
    /// `smoothing` is expected to be clamped already (see `ExtrapolationConfig`).
    pub fn new(smoothing: f64) -> Self {
        Self { smoothing }
    }

    pub fn set_smoothing(&mut self, smoothing: f64) {
        self.smoothing = smoothing;
    }

    /// Produces the pose for this frame.
    ///
    /// # Arguments
    /// * `prediction`: The trend evaluated for this frame.
    /// * `previous`: The last published pose.
    /// * `dt`: Seconds since `previous` was published. The velocity is left
    ///   unchanged when this is not positive.
    /// * `mounting`: The device's static mounting transform.
    pub fn blend(
        &self,
        prediction: &Prediction,
        previous: &FramePose,
        dt: f64,
        mounting: &MountingTransform,
    ) -> FramePose {
        let s = self.smoothing;

        // --- 1. Unit-length prediction on the previous pose's side of the double cover ---
        let predicted_orientation =
            hemisphere::renormalize_or(&prediction.pose.orientation, &previous.orientation);
        let predicted_orientation = hemisphere::align_to(&predicted_orientation, &previous.orientation);

        // --- 2. Exponential smoothing towards the prediction ---
        let position = prediction.pose.position * (1.0 - s) + previous.position * s;
        let orientation = Orientation::from(
            predicted_orientation.coords * (1.0 - s) + previous.orientation.coords * s,
        );
        let orientation = hemisphere::renormalize_or(&orientation, &previous.orientation);

        // --- 3. Velocity by filtered finite difference ---
        let velocity = if dt > 0.0 {
            previous.velocity * VELOCITY_RETENTION
                + (position - previous.position) * ((1.0 - VELOCITY_RETENTION) / dt)
        } else {
            previous.velocity
        };

        FramePose {
            position,
            orientation,
            velocity,
            time_offset: -prediction.clamped_by,
            mounting: *mounting,
        }
    }
}

impl Default for PoseBlender {
    fn default() -> Self {
        Self::new(0.5)
    }
}
