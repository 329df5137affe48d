//! Acceleration-magnitude fall and shake detector.
//!
//! Push model: the sensor callback hands one [`MotionSample`] at a time to
//! [`MotionAnomalyDetector::classify`].  Classification is O(1), allocates
//! nothing and never blocks.
//!
//! | Anomaly    | Condition                                   | Debounce            |
//! |------------|---------------------------------------------|---------------------|
//! | `Fall`     | \|a\| > fall threshold (2.5 g)              | 5 s suppression     |
//! | `ShakeSos` | \|a\| > shake threshold (3.0 g)             | none (intentional)  |
//!
//! A single physical impact produces many samples above threshold; the
//! suppression window collapses them into one `Fall`.  Rotation rate is
//! accepted and tracked but does not classify yet.

use heapless::Vec;
use log::{debug, info};

use crate::config::EmergencyConfig;
use crate::error::SampleError;
use crate::model::{CandidateKind, Millis, MotionSample};

/// Anomalies a single sample can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionAnomaly {
    Fall,
    ShakeSos,
}

impl MotionAnomaly {
    pub const fn candidate_kind(self) -> CandidateKind {
        match self {
            Self::Fall => CandidateKind::Fall,
            Self::ShakeSos => CandidateKind::ShakeSos,
        }
    }
}

/// Result of classifying one sample.  Empty means `None`; a hard impact
/// can yield both `Fall` and `ShakeSos`, in that order.
pub type Classification = Vec<MotionAnomaly, 2>;

pub struct MotionAnomalyDetector {
    fall_threshold_g: f64,
    shake_threshold_g: f64,
    suppression_ms: Millis,
    max_plausible_g: f64,
    /// Timestamp of the last emitted fall, if any.
    last_fall_ms: Option<Millis>,
    /// Rotation-rate magnitude of the last sample with finite rotation.
    last_rotation_rate: f64,
    samples_seen: u64,
    samples_dropped: u64,
}

impl MotionAnomalyDetector {
    pub fn new(config: &EmergencyConfig) -> Self {
        Self {
            fall_threshold_g: config.fall_threshold_g,
            shake_threshold_g: config.shake_threshold_g,
            suppression_ms: config.fall_suppression_ms,
            max_plausible_g: config.max_plausible_g,
            last_fall_ms: None,
            last_rotation_rate: 0.0,
            samples_seen: 0,
            samples_dropped: 0,
        }
    }

    /// Pick up new thresholds without losing the suppression window.
    pub fn reconfigure(&mut self, config: &EmergencyConfig) {
        self.fall_threshold_g = config.fall_threshold_g;
        self.shake_threshold_g = config.shake_threshold_g;
        self.suppression_ms = config.fall_suppression_ms;
        self.max_plausible_g = config.max_plausible_g;
    }

    /// Classify one sample.
    ///
    /// Malformed acceleration (NaN, infinity, implausible magnitude) is
    /// rejected with a [`SampleError`] and leaves the suppression window
    /// untouched.  Malformed rotation is ignored.
    pub fn classify(&mut self, sample: &MotionSample) -> Result<Classification, SampleError> {
        self.samples_seen = self.samples_seen.saturating_add(1);

        if sample.rotation_rate.is_finite() {
            self.last_rotation_rate = sample.rotation_rate.magnitude();
        }

        if !sample.acceleration.is_finite() {
            self.samples_dropped = self.samples_dropped.saturating_add(1);
            return Err(SampleError::NonFinite);
        }
        let g = sample.acceleration.magnitude();
        if g > self.max_plausible_g {
            self.samples_dropped = self.samples_dropped.saturating_add(1);
            return Err(SampleError::OutOfRange);
        }

        let mut out = Classification::new();

        if g > self.fall_threshold_g {
            if self.is_suppressed(sample.timestamp_ms) {
                debug!("fall at {:.2} g suppressed (debounce window)", g);
            } else {
                info!("MOTION: fall signalled at {:.2} g (t={} ms)", g, sample.timestamp_ms);
                self.last_fall_ms = Some(sample.timestamp_ms);
                let _ = out.push(MotionAnomaly::Fall);
            }
        }

        if g > self.shake_threshold_g {
            info!("MOTION: shake SOS at {:.2} g (t={} ms)", g, sample.timestamp_ms);
            let _ = out.push(MotionAnomaly::ShakeSos);
        }

        Ok(out)
    }

    /// Whether a fall at `now_ms` would be dropped by the debounce window.
    ///
    /// The window is symmetric: slightly reordered samples stay suppressed,
    /// while a clock that jumped back by more than the window (sensor
    /// restart) starts fresh.
    pub fn is_suppressed(&self, now_ms: Millis) -> bool {
        matches!(self.last_fall_ms, Some(t) if now_ms.abs_diff(t) < self.suppression_ms)
    }

    pub fn last_rotation_rate(&self) -> f64 {
        self.last_rotation_rate
    }

    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    pub fn samples_dropped(&self) -> u64 {
        self.samples_dropped
    }
}
