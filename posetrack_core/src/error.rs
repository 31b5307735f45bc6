// posetrack_core/src/error.rs

use thiserror::Error;

use crate::channels::PoseChannel;

/// Why a raw sample was refused at ingestion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlierReason {
    /// The sample is further from the current prediction than the glitch threshold.
    PredictionMismatch { error_m: f64 },
    /// The sample lies outside the physically valid tracking volume.
    OutsidePlayspace { distance_m: f64 },
    /// The sample was captured longer ago than the retention horizon.
    TooOld { age_s: f64, max_age_s: f64 },
    /// The history is full of samples that are all newer than this one.
    Stale,
    /// A position or orientation component is NaN or infinite.
    NonFinite,
}

impl std::fmt::Display for OutlierReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutlierReason::PredictionMismatch { error_m } => {
                write!(f, "sample is {:.3} m away from the prediction", error_m)
            }
            OutlierReason::OutsidePlayspace { distance_m } => {
                write!(f, "sample is {:.3} m from the origin", distance_m)
            }
            OutlierReason::TooOld { age_s, max_age_s } => {
                write!(f, "sample age {:.3} s exceeds {:.3} s", age_s, max_age_s)
            }
            OutlierReason::Stale => write!(f, "sample is older than every stored sample"),
            OutlierReason::NonFinite => write!(f, "sample has a non-finite component"),
        }
    }
}

/// Every failure the tracking core knows about.
///
/// None of these escape to the host: the predictor turns them into
/// "skip this tick" or "sample dropped" outcomes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackingError {
    #[error("insufficient history: {available} samples stored, {required} required")]
    InsufficientHistory { available: usize, required: usize },

    #[error("outlier sample rejected: {0}")]
    OutlierSample(OutlierReason),

    #[error("degenerate regression on channel {channel:?}")]
    DegenerateRegression { channel: PoseChannel },

    #[error("numerical fault: {0}")]
    NumericalFault(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outlier_error_names_the_reason() {
        let err = TrackingError::OutlierSample(OutlierReason::PredictionMismatch { error_m: 0.6 });
        assert_eq!(
            err.to_string(),
            "outlier sample rejected: sample is 0.600 m away from the prediction"
        );
        let err = TrackingError::OutlierSample(OutlierReason::NonFinite);
        assert!(err.to_string().ends_with("non-finite component"));
    }
}
