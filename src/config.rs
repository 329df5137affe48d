//! System configuration parameters
//!
//! All tunable parameters for the emergency core.  Every constant the
//! detectors, the countdown and the alert planner use lives here so a host
//! can override them (tests, locales, clinical profiles).

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};

/// Physiological bands a vitals snapshot is checked against.
///
/// Values strictly outside a band are abnormal; the bounds themselves are
/// normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsBands {
    /// Resting heart rate band (bpm).
    pub heart_rate_min: f64,
    pub heart_rate_max: f64,
    /// Systolic blood pressure band (mmHg).
    pub systolic_min: f64,
    pub systolic_max: f64,
    /// Minimum blood oxygen saturation (%).
    pub spo2_min: f64,
    /// Body temperature band (°F).
    pub temperature_min_f: f64,
    pub temperature_max_f: f64,
}

impl Default for VitalsBands {
    fn default() -> Self {
        Self {
            heart_rate_min: 60.0,
            heart_rate_max: 100.0,
            systolic_min: 90.0,
            systolic_max: 140.0,
            spo2_min: 95.0,
            temperature_min_f: 95.0,
            temperature_max_f: 100.4,
        }
    }
}

/// A person to notify when an emergency opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone_number: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub is_primary: bool,
}

/// User-facing alert preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertPreferences {
    pub enable_voice_alerts: bool,
    pub enable_haptic_feedback: bool,
    /// BCP-47 tag handed to the speech collaborator.
    pub speech_language: String,
    /// Speech rate in the collaborator's 0.0–1.0 scale.
    pub speech_rate: f32,
}

impl Default for AlertPreferences {
    fn default() -> Self {
        Self {
            enable_voice_alerts: true,
            enable_haptic_feedback: true,
            speech_language: "en-US".into(),
            speech_rate: 0.5,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyConfig {
    // --- Motion ---
    /// Acceleration magnitude (g) above which a fall is signalled
    pub fall_threshold_g: f64,
    /// Acceleration magnitude (g) above which a shake SOS is signalled
    pub shake_threshold_g: f64,
    /// Debounce window after a fall signal (milliseconds)
    pub fall_suppression_ms: u64,
    /// Magnitudes above this are treated as sensor garbage (g)
    pub max_plausible_g: f64,

    // --- Vitals ---
    pub vitals: VitalsBands,

    // --- Escalation ---
    /// Countdown length before an automatic call (seconds)
    pub countdown_secs: u32,
    /// Number dialled for every emergency kind
    pub emergency_number: String,

    // --- Alerting ---
    pub contacts: Vec<EmergencyContact>,
    pub preferences: AlertPreferences,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            // Motion
            fall_threshold_g: 2.5,
            shake_threshold_g: 3.0,
            fall_suppression_ms: 5_000,
            max_plausible_g: 50.0,

            // Vitals
            vitals: VitalsBands::default(),

            // Escalation
            countdown_secs: 30,
            emergency_number: "911".into(),

            // Alerting
            contacts: Vec::new(),
            preferences: AlertPreferences::default(),
        }
    }
}

impl EmergencyConfig {
    /// Reject values that would make detection or escalation meaningless.
    /// Invalid values are rejected, never clamped.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.fall_threshold_g) {
            return Err(ConfigError::ValidationFailed("fall_threshold_g must be > 0"));
        }
        if !positive(self.shake_threshold_g) {
            return Err(ConfigError::ValidationFailed("shake_threshold_g must be > 0"));
        }
        if !positive(self.max_plausible_g)
            || self.max_plausible_g <= self.fall_threshold_g.max(self.shake_threshold_g)
        {
            return Err(ConfigError::ValidationFailed(
                "max_plausible_g must exceed both motion thresholds",
            ));
        }
        if self.countdown_secs == 0 {
            return Err(ConfigError::ValidationFailed("countdown_secs must be > 0"));
        }
        if self.emergency_number.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("emergency_number must not be empty"));
        }

        let b = &self.vitals;
        if !(b.heart_rate_min < b.heart_rate_max) {
            return Err(ConfigError::ValidationFailed("heart rate band inverted"));
        }
        if !(b.systolic_min < b.systolic_max) {
            return Err(ConfigError::ValidationFailed("systolic band inverted"));
        }
        if !(b.temperature_min_f < b.temperature_max_f) {
            return Err(ConfigError::ValidationFailed("temperature band inverted"));
        }
        if !(b.spo2_min > 0.0 && b.spo2_min <= 100.0) {
            return Err(ConfigError::ValidationFailed("spo2_min must be within (0, 100]"));
        }
        if self
            .contacts
            .iter()
            .any(|c| c.phone_number.trim().is_empty())
        {
            return Err(ConfigError::ValidationFailed("contact phone_number must not be empty"));
        }
        Ok(())
    }

    /// Parse a JSON override document and validate it.  Missing fields fall
    /// back to their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            log::warn!("config JSON rejected: {e}");
            Error::Config(ConfigError::Malformed)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Compact binary encoding for collaborators that persist the config.
    pub fn to_postcard(&self) -> Result<Vec<u8>> {
        postcard::to_allocvec(self).map_err(|_| Error::Config(ConfigError::Malformed))
    }

    pub fn from_postcard(bytes: &[u8]) -> Result<Self> {
        let config: Self =
            postcard::from_bytes(bytes).map_err(|_| Error::Config(ConfigError::Malformed))?;
        config.validate()?;
        Ok(config)
    }

    /// True if at least one configured contact is flagged primary.
    pub fn has_primary_contact(&self) -> bool {
        self.contacts.iter().any(|c| c.is_primary)
    }
}
