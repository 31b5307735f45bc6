// posetrack_core/src/extrapolation.rs

//! Per-channel least-squares trend over the sample history.
//!
//! Every channel (3 position + 4 quaternion components) gets its own line
//! `value = a + b * age`, fitted over all stored samples, and is evaluated at
//! the age that corresponds to the requested instant. Ages grow into the past,
//! so a lead time `L` seconds into the future is evaluated at age `-L`.
//!
//! The quaternion channels are regressed independently, so the predicted
//! orientation is not unit length. Callers renormalize it (see `hemisphere`).

use tracing::trace;

use crate::channels::{ChannelVector, PoseChannel, CHANNEL_COUNT};
use crate::error::TrackingError;
use crate::history::SampleHistory;
use crate::types::TrackedPose;

/// The regression needs spread in the time dimension.
pub const MIN_SAMPLES: usize = 4;

/// The furthest a trend may be projected past the newest sample, in seconds.
pub const EXTRAPOLATION_HORIZON: f64 = 0.2;

/// Variances below this are treated as zero.
const VARIANCE_EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionStatus {
    /// Evaluated at the requested time.
    Nominal,
    /// The requested time was beyond the horizon and was clamped to it.
    HorizonClamped,
}

impl PredictionStatus {
    /// Numeric status code: `0` nominal, `1` clamped.
    pub fn code(self) -> i32 {
        match self {
            PredictionStatus::Nominal => 0,
            PredictionStatus::HorizonClamped => 1,
        }
    }
}

/// Maps a prediction result onto the numeric status codes, with `-1` for
/// "no prediction possible".
pub fn status_code(result: &Result<Prediction, TrackingError>) -> i32 {
    match result {
        Ok(prediction) => prediction.status.code(),
        Err(_) => -1,
    }
}

/// The trend evaluated at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Raw per-channel values. The orientation is not normalized.
    pub pose: TrackedPose,
    pub status: PredictionStatus,
    /// Lead actually used, relative to the history's reference instant.
    pub lead: f64,
    /// How far the requested lead was cut back by the horizon clamp (>= 0).
    pub clamped_by: f64,
}

/// Mean and variance of the sample ages, shared by every channel.
#[derive(Debug, Clone, Copy)]
struct TimeMoments {
    mean: f64,
    variance: f64,
}

impl TimeMoments {
    fn collect(history: &SampleHistory) -> Self {
        let (n, sum, sum_sq) = history
            .iter()
            .fold((0usize, 0.0, 0.0), |(n, sum, sum_sq), s| {
                (n + 1, sum + s.age, sum_sq + s.age * s.age)
            });
        let n = n as f64;
        let mean = sum / n;
        Self {
            mean,
            variance: sum_sq / n - mean * mean,
        }
    }
}

/// A fitted line `value = intercept + slope * age`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    pub fn evaluate(&self, age: f64) -> f64 {
        self.intercept + self.slope * age
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ChannelMoments {
    mean: f64,
    mean_sq: f64,
    mean_cross: f64,
}

impl ChannelMoments {
    fn collect(history: &SampleHistory, channel: PoseChannel) -> Self {
        let n = history.len() as f64;
        let mut moments = history.iter().fold(Self::default(), |mut acc, s| {
            let value = TrackedPose {
                position: s.position,
                orientation: s.orientation,
            }
            .channel(channel);
            acc.mean += value;
            acc.mean_sq += value * value;
            acc.mean_cross += s.age * value;
            acc
        });
        moments.mean /= n;
        moments.mean_sq /= n;
        moments.mean_cross /= n;
        moments
    }

    /// Fits `value = a + b * age` as `b = r * (s_v / s_t)`, `a = mean_v - b * mean_t`.
    fn fit(&self, time: &TimeMoments, channel: PoseChannel) -> Result<LinearFit, TrackingError> {
        let value_variance = self.mean_sq - self.mean * self.mean;
        if value_variance.abs() < VARIANCE_EPSILON || time.variance < VARIANCE_EPSILON {
            return Err(TrackingError::DegenerateRegression { channel });
        }

        let st = time.variance.sqrt();
        let sv = value_variance.sqrt();
        let correlation = (self.mean_cross - self.mean * time.mean) / (st * sv);
        let slope = correlation * (sv / st);

        Ok(LinearFit {
            intercept: self.mean - slope * time.mean,
            slope,
        })
    }
}

/// Evaluates the linear trend of a `SampleHistory` at a requested lead time.
#[derive(Debug, Clone, Copy)]
pub struct TrendExtrapolator {
    pub horizon: f64,
    pub min_samples: usize,
}

impl Default for TrendExtrapolator {
    fn default() -> Self {
        Self {
            horizon: EXTRAPOLATION_HORIZON,
            min_samples: MIN_SAMPLES,
        }
    }
}

impl TrendExtrapolator {
    /// Predicts the pose `lead` seconds after the history's reference instant
    /// (the moment it was last aged). Negative leads look into the past.
    ///
    /// # Returns
    /// * `Ok(Prediction)` with `Nominal` or `HorizonClamped` status.
    /// * `Err(TrackingError::InsufficientHistory)` when fewer than
    ///   `min_samples` samples are stored. The output must not be used.
    pub fn predict(&self, history: &SampleHistory, lead: f64) -> Result<Prediction, TrackingError> {
        let available = history.len();
        if available < self.min_samples {
            return Err(TrackingError::InsufficientHistory {
                available,
                required: self.min_samples,
            });
        }

        let (lead_used, status) = if lead > self.horizon {
            (self.horizon, PredictionStatus::HorizonClamped)
        } else {
            (lead, PredictionStatus::Nominal)
        };
        let target_age = -lead_used;

        let time = TimeMoments::collect(history);

        let mut values: ChannelVector = [0.0; CHANNEL_COUNT];
        for channel in PoseChannel::ALL {
            let moments = ChannelMoments::collect(history, channel);
            values[channel.index()] = match moments.fit(&time, channel) {
                Ok(fit) => fit.evaluate(target_age),
                Err(err) => {
                    trace!("{}, using the channel mean", err);
                    moments.mean
                }
            };
        }

        Ok(Prediction {
            pose: TrackedPose::from_channels(&values),
            status,
            lead: lead_used,
            clamped_by: lead - lead_used,
        })
    }
}
