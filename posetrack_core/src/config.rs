// posetrack_core/src/config.rs

use serde::{Deserialize, Serialize};

/// Tuning for one device's prediction pipeline.
///
/// Values are clamped into their valid ranges whenever a config is built
/// through `new` or `clamped`, so a deserialized config should be passed
/// through `clamped` before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtrapolationConfig {
    /// Number of sample slots kept in the history.
    pub capacity: usize,
    /// Samples older than this many seconds are expired.
    pub max_age_seconds: f64,
    /// Weight of the previously published pose in the blend, in `[0, 0.99]`.
    pub smoothing_factor: f64,
}

impl Default for ExtrapolationConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            max_age_seconds: 1.0,
            smoothing_factor: 0.5,
        }
    }
}

impl ExtrapolationConfig {
    /// The regression needs 4 points; one extra slot gives headroom.
    pub const MIN_CAPACITY: usize = 5;
    pub const MAX_SMOOTHING: f64 = 0.99;

    pub fn new(capacity: usize, max_age_seconds: f64, smoothing_factor: f64) -> Self {
        Self {
            capacity,
            max_age_seconds,
            smoothing_factor,
        }
        .clamped()
    }

    /// Returns a copy with every field forced into its valid range.
    pub fn clamped(self) -> Self {
        let smoothing_factor = if self.smoothing_factor.is_nan() {
            0.0
        } else {
            self.smoothing_factor.clamp(0.0, Self::MAX_SMOOTHING)
        };
        let max_age_seconds = if self.max_age_seconds.is_nan() {
            0.0
        } else {
            self.max_age_seconds.max(0.0)
        };

        Self {
            capacity: self.capacity.max(Self::MIN_CAPACITY),
            max_age_seconds,
            smoothing_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_clamped_up_to_five() {
        assert_eq!(ExtrapolationConfig::new(2, 1.0, 0.5).capacity, 5);
        assert_eq!(ExtrapolationConfig::new(10, 1.0, 0.5).capacity, 10);
    }

    #[test]
    fn smoothing_is_clamped_to_unit_range() {
        assert_eq!(ExtrapolationConfig::new(5, 1.0, -0.5).smoothing_factor, 0.0);
        assert_eq!(ExtrapolationConfig::new(5, 1.0, 1.5).smoothing_factor, 0.99);
        assert_eq!(ExtrapolationConfig::new(5, 1.0, 0.3).smoothing_factor, 0.3);
        assert_eq!(
            ExtrapolationConfig::new(5, 1.0, f64::NAN).smoothing_factor,
            0.0
        );
    }
}
