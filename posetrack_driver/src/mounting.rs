// posetrack_driver/src/mounting.rs

//! Static mounting transforms between a tracked point and its reported anchor.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A rotation of `angle_deg` about `axis` in the driver's convention, which
/// turns by the *negated* angle (a positive angle tilts the anchor backwards).
pub fn driver_axis_angle(angle_deg: f64, axis: &nalgebra::Unit<Vector3<f64>>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_axis_angle(axis, -angle_deg.to_radians())
}

/// Mounting as written in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MountingSettings {
    /// Rotation about the vertical axis, applied first.
    pub yaw_deg: f64,
    /// Rotation about the lateral axis, applied after the yaw.
    pub pitch_deg: f64,
    pub translation: [f64; 3],
}

impl Default for MountingSettings {
    fn default() -> Self {
        Self {
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            translation: [0.0; 3],
        }
    }
}

impl MountingSettings {
    /// The head-mounted tracker sits turned 45 degrees and tilted 30 degrees
    /// relative to the forward view direction.
    pub fn head_mounted() -> Self {
        Self {
            yaw_deg: -45.0,
            pitch_deg: 30.0,
            translation: [0.0; 3],
        }
    }

    pub fn to_isometry(&self) -> Isometry3<f64> {
        let rotation = driver_axis_angle(self.yaw_deg, &Vector3::y_axis())
            * driver_axis_angle(self.pitch_deg, &Vector3::x_axis());
        let [x, y, z] = self.translation;
        Isometry3::from_parts(Translation3::new(x, y, z), rotation)
    }
}
