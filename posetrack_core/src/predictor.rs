// posetrack_core/src/predictor.rs

//! The per-device prediction pipeline.
//!
//! A `PosePredictor` owns one sample history, one config and the last pose it
//! published. Raw samples go in through `ingest_sample` at whatever rate the
//! tracking source delivers them; once per output frame `tick` predicts the
//! pose for "now", blends it with the previous output and returns it.
//! Nothing here is shared between devices.

use tracing::{debug, info};

use crate::blender::PoseBlender;
use crate::config::ExtrapolationConfig;
use crate::diagnostics::DiagnosticSink;
use crate::error::{OutlierReason, TrackingError};
use crate::extrapolation::{Prediction, TrendExtrapolator};
use crate::hemisphere;
use crate::history::{InsertOutcome, SampleHistory};
use crate::types::{FramePose, MountingTransform, Orientation, PoseSample, RawSample};

/// Samples further than this from the current prediction are treated as glitches.
pub const MAX_PREDICTION_ERROR_M: f64 = 0.5;

/// Samples further than this from the origin are outside the tracking volume.
pub const PLAYSPACE_RADIUS_M: f64 = 10.0;

/// What happened to a raw sample handed to `ingest_sample`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IngestOutcome {
    Accepted,
    Rejected(OutlierReason),
}

impl IngestOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, IngestOutcome::Accepted)
    }
}

/// Rejections that are routine rather than glitches only reach `tracing`.
fn drop_silently(reason: OutlierReason) -> IngestOutcome {
    debug!("Dropped a pose sample: {}", TrackingError::OutlierSample(reason));
    IngestOutcome::Rejected(reason)
}

#[derive(Debug, Clone)]
pub struct PosePredictor {
    config: ExtrapolationConfig,
    history: SampleHistory,
    extrapolator: TrendExtrapolator,
    blender: PoseBlender,
    mounting: MountingTransform,
    /// The most recent fully computed pose. `None` until the first publish.
    last_pose: Option<FramePose>,
    /// Wall-clock seconds at which the history was last aged.
    last_update_timestamp: Option<f64>,
    /// Wall-clock seconds of the last successful tick.
    last_tick_timestamp: Option<f64>,
}

impl PosePredictor {
    pub fn new(config: ExtrapolationConfig, mounting: MountingTransform) -> Self {
        let config = config.clamped();
        Self {
            config,
            history: SampleHistory::new(config.capacity, config.max_age_seconds),
            extrapolator: TrendExtrapolator::default(),
            blender: PoseBlender::new(config.smoothing_factor),
            mounting,
            last_pose: None,
            last_update_timestamp: None,
            last_tick_timestamp: None,
        }
    }

    pub fn config(&self) -> &ExtrapolationConfig {
        &self.config
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    pub fn mounting(&self) -> &MountingTransform {
        &self.mounting
    }

    pub fn set_mounting(&mut self, mounting: MountingTransform) {
        self.mounting = mounting;
    }

    pub fn last_pose(&self) -> Option<&FramePose> {
        self.last_pose.as_ref()
    }

    /// Predicts the pose `requested_offset` seconds after `now`.
    ///
    /// The history's ages are relative to the last insert, so the time passed
    /// since then is added to the lead before the trend is evaluated.
    pub fn predict(&self, requested_offset: f64, now: f64) -> Result<Prediction, TrackingError> {
        let since_update = self
            .last_update_timestamp
            .map_or(0.0, |last| (now - last).max(0.0));
        self.extrapolator
            .predict(&self.history, since_update + requested_offset)
    }

    /// Feeds one raw measurement into the history.
    ///
    /// The history is aged to `now` first. The sample is then checked against
    /// the current prediction and the playspace bounds, flipped into the
    /// prediction's hemisphere, and inserted in age order. Rejections are
    /// reported through `diagnostics` (glitches) or `tracing` (silent drops).
    pub fn ingest_sample(
        &mut self,
        sample: &RawSample,
        now: f64,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> IngestOutcome {
        // --- 1. Re-base every stored age onto `now` ---
        if let Some(last) = self.last_update_timestamp {
            self.history.age_all((now - last).max(0.0));
        }
        self.last_update_timestamp = Some(now);

        // NaN compares false against every threshold below, so it must be
        // caught before any of them.
        let finite = sample.position.iter().all(|v| v.is_finite())
            && sample.orientation.coords.iter().all(|v| v.is_finite());
        if !finite {
            return drop_silently(OutlierReason::NonFinite);
        }

        // --- 2. Compare against what we currently believe ---
        let prediction = self.extrapolator.predict(&self.history, 0.0).ok();

        if let Some(prediction) = &prediction {
            let error_m = (sample.position - prediction.pose.position).norm();
            if error_m > MAX_PREDICTION_ERROR_M {
                diagnostics.log_line(&format!(
                    "Dropped a pose sample, its error was {:.3} m",
                    error_m
                ));
                return IngestOutcome::Rejected(OutlierReason::PredictionMismatch { error_m });
            }
        }

        let distance_m = sample.position.norm();
        if distance_m > PLAYSPACE_RADIUS_M {
            diagnostics.log_line(&format!(
                "Dropped a pose sample outside the playspace, {:.3} m from the origin",
                distance_m
            ));
            return IngestOutcome::Rejected(OutlierReason::OutsidePlayspace { distance_m });
        }

        let age = sample.age();
        if age > self.config.max_age_seconds {
            return drop_silently(OutlierReason::TooOld {
                age_s: age,
                max_age_s: self.config.max_age_seconds,
            });
        }

        // --- 3. Keep the stored orientations on one side of the double cover ---
        let reference: Option<Orientation> = prediction
            .map(|p| p.pose.orientation)
            .or_else(|| self.history.newest().map(|s| s.orientation));
        let orientation = match reference {
            Some(reference) => hemisphere::align_to(&sample.orientation, &reference),
            None => sample.orientation,
        };

        // --- 4. Insert ---
        match self.history.insert(PoseSample {
            age,
            position: sample.position,
            orientation,
        }) {
            InsertOutcome::Inserted { .. } => IngestOutcome::Accepted,
            InsertOutcome::TooOld => drop_silently(OutlierReason::TooOld {
                age_s: age,
                max_age_s: self.history.max_age(),
            }),
            InsertOutcome::Stale => drop_silently(OutlierReason::Stale),
        }
    }


    /// Computes this frame's pose, or `None` while the history is too short.
    ///
    /// A skipped frame leaves every piece of state untouched, so the next
    /// tick's velocity spans the gap.
    pub fn tick(&mut self, now: f64) -> Option<FramePose> {
        let prediction = match self.predict(0.0, now) {
            Ok(prediction) => prediction,
            Err(err) => {
                debug!("Skipping frame: {}", err);
                return None;
            }
        };

        let pose = match (&self.last_pose, self.last_tick_timestamp) {
            (Some(previous), Some(last_tick)) => {
                self.blender
                    .blend(&prediction, previous, now - last_tick, &self.mounting)
            }
            // Nothing to smooth against yet: publish the prediction itself.
            _ => PoseBlender::new(0.0).blend(&prediction, &FramePose::default(), 0.0, &self.mounting),
        };

        self.last_pose = Some(pose);
        self.last_tick_timestamp = Some(now);
        Some(pose)
    }

    /// Applies new tuning and cold-resets the history.
    ///
    /// Capacity and smoothing are clamped. Every stored sample is discarded,
    /// so ticks report insufficient history until enough fresh samples arrive.
    /// The last published pose is kept so the output resumes smoothly.
    pub fn reconfigure(&mut self, capacity: usize, max_age_seconds: f64, smoothing_factor: f64) {
        self.apply_config(ExtrapolationConfig::new(
            capacity,
            max_age_seconds,
            smoothing_factor,
        ));
    }

    pub fn apply_config(&mut self, config: ExtrapolationConfig) {
        let config = config.clamped();
        info!(
            "Reinitialising pose history: capacity {}, max age {:.3} s, smoothing {:.2}",
            config.capacity, config.max_age_seconds, config.smoothing_factor
        );
        self.config = config;
        self.history = SampleHistory::new(config.capacity, config.max_age_seconds);
        self.blender.set_smoothing(config.smoothing_factor);
        self.last_update_timestamp = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use crate::extrapolation::{status_code, PredictionStatus};
    use approx::assert_relative_eq;
    use nalgebra::{Isometry3, Quaternion, Vector3};

    fn predictor() -> PosePredictor {
        PosePredictor::new(ExtrapolationConfig::new(5, 1.0, 0.0), Isometry3::identity())
    }

    fn at(x: f64) -> RawSample {
        RawSample::new(Vector3::new(x, 0.0, 0.0), Quaternion::identity(), 0.0)
    }

    /// Five samples 0.1 s apart with x = 0, 1, 2, 3, 4 (the last one at t = 0.4).
    fn warmed_up(predictor: &mut PosePredictor, log: &mut RecordingDiagnostics) {
        for i in 0..5 {
            let outcome = predictor.ingest_sample(&at(i as f64 * 0.1), i as f64 * 0.1, log);
            assert!(outcome.is_accepted());
        }
    }

    #[test]
    fn insufficient_history_skips_the_tick() {
        let mut predictor = predictor();
        let mut log = RecordingDiagnostics::default();
        for i in 0..3 {
            predictor.ingest_sample(&at(0.0), i as f64 * 0.1, &mut log);
        }
        assert_eq!(status_code(&predictor.predict(0.0, 0.2)), -1);
        assert!(predictor.tick(0.2).is_none());
        assert!(predictor.last_pose().is_none());
    }

    #[test]
    fn linear_motion_is_tracked_and_extrapolated() {
        let mut predictor = predictor();
        let mut log = RecordingDiagnostics::default();
        warmed_up(&mut predictor, &mut log);

        let now = predictor.predict(0.0, 0.4).unwrap();
        assert_eq!(now.status, PredictionStatus::Nominal);
        assert_relative_eq!(now.pose.position.x, 0.4, epsilon = 1e-9);

        // 0.05 s after the last sample the trend has moved on by 0.05 m.
        let later = predictor.predict(0.0, 0.45).unwrap();
        assert_relative_eq!(later.pose.position.x, 0.45, epsilon = 1e-9);

        let far = predictor.predict(0.5, 0.4).unwrap();
        assert_eq!(far.status, PredictionStatus::HorizonClamped);
        assert_relative_eq!(far.pose.position.x, 0.6, epsilon = 1e-9);
    }

    #[test]
    fn glitch_sample_is_dropped_with_one_diagnostic() {
        let mut predictor = PosePredictor::new(
            ExtrapolationConfig::new(8, 1.0, 0.0),
            Isometry3::identity(),
        );
        let mut log = RecordingDiagnostics::default();
        for i in 0..5 {
            predictor.ingest_sample(&at(0.0), i as f64 * 0.01, &mut log);
        }
        assert!(log.lines().is_empty());

        let outcome = predictor.ingest_sample(&at(0.6), 0.05, &mut log);
        match outcome {
            IngestOutcome::Rejected(OutlierReason::PredictionMismatch { error_m }) => {
                assert_relative_eq!(error_m, 0.6, epsilon = 1e-9)
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(log.lines().len(), 1);
        assert!(log.lines()[0].contains("0.6"), "line was {:?}", log.lines()[0]);
        assert_eq!(predictor.history().len(), 5);
    }

    #[test]
    fn samples_outside_the_playspace_are_dropped() {
        let mut predictor = predictor();
        let mut log = RecordingDiagnostics::default();
        let outcome = predictor.ingest_sample(&at(12.0), 0.0, &mut log);
        assert!(matches!(
            outcome,
            IngestOutcome::Rejected(OutlierReason::OutsidePlayspace { .. })
        ));
        assert!(predictor.history().is_empty());
    }

    #[test]
    fn non_finite_samples_are_dropped_and_the_gate_stays_armed() {
        let mut predictor = predictor();
        let mut log = RecordingDiagnostics::default();
        warmed_up(&mut predictor, &mut log);

        let nan_position = predictor.ingest_sample(&at(f64::NAN), 0.5, &mut log);
        assert_eq!(nan_position, IngestOutcome::Rejected(OutlierReason::NonFinite));
        let bad_orientation = RawSample::new(
            Vector3::new(0.5, 0.0, 0.0),
            Quaternion::new(1.0, f64::INFINITY, 0.0, 0.0),
            0.0,
        );
        let outcome = predictor.ingest_sample(&bad_orientation, 0.5, &mut log);
        assert_eq!(outcome, IngestOutcome::Rejected(OutlierReason::NonFinite));
        assert!(log.lines().is_empty());
        assert_eq!(predictor.history().len(), 5);

        // A 5 m jump must still be caught by the prediction mismatch check.
        assert!(matches!(
            predictor.ingest_sample(&at(5.0), 0.5, &mut log),
            IngestOutcome::Rejected(OutlierReason::PredictionMismatch { .. })
        ));

        let pose = predictor.tick(0.5).unwrap();
        assert!(pose.position.iter().all(|v| v.is_finite()));
        assert!(pose.orientation.coords.iter().all(|v| v.is_finite()));
        assert_relative_eq!(pose.position.x, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn samples_older_than_retention_are_dropped() {
        let mut predictor = predictor();
        let mut log = RecordingDiagnostics::default();
        let sample = RawSample::new(Vector3::zeros(), Quaternion::identity(), -1.5);
        let outcome = predictor.ingest_sample(&sample, 0.0, &mut log);
        assert!(matches!(
            outcome,
            IngestOutcome::Rejected(OutlierReason::TooOld { .. })
        ));
        assert!(log.lines().is_empty());
    }

    #[test]
    fn opposite_hemisphere_sample_is_stored_flipped() {
        let mut predictor = predictor();
        let mut log = RecordingDiagnostics::default();
        for i in 0..4 {
            predictor.ingest_sample(&at(0.0), i as f64 * 0.01, &mut log);
        }
        let flipped = RawSample::new(Vector3::zeros(), Quaternion::new(-0.99, 0.01, 0.0, 0.0), 0.0);
        assert!(predictor.ingest_sample(&flipped, 0.04, &mut log).is_accepted());

        let stored = predictor.history().newest().unwrap().orientation;
        assert_eq!(stored, Quaternion::new(0.99, -0.01, 0.0, 0.0));
    }

    #[test]
    fn expired_history_lets_a_relocated_tracker_recover() {
        let mut predictor = predictor();
        let mut log = RecordingDiagnostics::default();
        for i in 0..5 {
            predictor.ingest_sample(&at(0.0), i as f64 * 0.1, &mut log);
        }
        // The tracker jumped by 2 m: rejected while the old trend is alive.
        assert!(!predictor.ingest_sample(&at(2.0), 0.5, &mut log).is_accepted());
        // Once the old samples have expired the new location is accepted.
        assert!(predictor.ingest_sample(&at(2.0), 2.0, &mut log).is_accepted());
    }

    #[test]
    fn first_tick_publishes_the_prediction_then_smooths() {
        let mut predictor = PosePredictor::new(
            ExtrapolationConfig::new(5, 1.0, 0.5),
            Isometry3::identity(),
        );
        let mut log = RecordingDiagnostics::default();
        warmed_up(&mut predictor, &mut log);

        let first = predictor.tick(0.4).unwrap();
        assert_relative_eq!(first.position.x, 0.4, epsilon = 1e-9);
        assert_eq!(first.velocity, Vector3::zeros());

        let second = predictor.tick(0.45).unwrap();
        // Half way between the old pose (0.4) and the new prediction (0.45).
        assert_relative_eq!(second.position.x, 0.425, epsilon = 1e-9);
        assert_relative_eq!(second.velocity.x, 0.2 * 0.025 / 0.05, epsilon = 1e-9);
        assert_relative_eq!(second.orientation.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn reconfigure_cold_resets_the_history() {
        let mut predictor = predictor();
        let mut log = RecordingDiagnostics::default();
        warmed_up(&mut predictor, &mut log);
        assert_eq!(predictor.history().len(), 5);

        predictor.reconfigure(10, 2.0, 0.5);
        assert_eq!(predictor.history().len(), 0);
        assert_eq!(predictor.history().capacity(), 10);
        assert_eq!(predictor.config().max_age_seconds, 2.0);
        assert_eq!(predictor.config().smoothing_factor, 0.5);
        assert!(predictor.tick(0.5).is_none());

        predictor.reconfigure(2, 2.0, 1.5);
        assert_eq!(predictor.history().capacity(), 5);
        assert_eq!(predictor.config().smoothing_factor, 0.99);

        predictor.reconfigure(5, 1.0, -0.5);
        assert_eq!(predictor.config().smoothing_factor, 0.0);
    }

    #[test]
    fn published_pose_carries_the_mounting() {
        let mounting = Isometry3::translation(0.0, 0.0, -0.1);
        let mut predictor = PosePredictor::new(ExtrapolationConfig::default(), mounting);
        let mut log = RecordingDiagnostics::default();
        warmed_up(&mut predictor, &mut log);
        assert_eq!(predictor.tick(0.4).unwrap().mounting, mounting);
    }
}
