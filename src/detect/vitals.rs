//! Vitals anomaly evaluator.
//!
//! Checks each present field of a [`VitalsSnapshot`] against its
//! [`VitalsBands`] band.  Fields are visited in a fixed order so the first
//! violation reported is deterministic:
//!
//! 1. heart rate
//! 2. systolic pressure
//! 3. oxygen saturation
//! 4. temperature
//!
//! A missing (or non-finite) field never contributes.  Diastolic pressure
//! and respiratory rate are carried but have no band.

use core::fmt;

use log::debug;

use crate::config::VitalsBands;
use crate::model::VitalsSnapshot;

/// One violated band.  Values double as bitmask positions, like the
/// safety fault masks in the firmware this evaluator follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VitalsFlag {
    HeartRate = 0b0000_0001,
    SystolicPressure = 0b0000_0010,
    OxygenSaturation = 0b0000_0100,
    Temperature = 0b0000_1000,
}

impl VitalsFlag {
    /// Evaluation order.
    pub const ORDER: [Self; 4] = [
        Self::HeartRate,
        Self::SystolicPressure,
        Self::OxygenSaturation,
        Self::Temperature,
    ];

    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for VitalsFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeartRate => write!(f, "heart rate"),
            Self::SystolicPressure => write!(f, "systolic pressure"),
            Self::OxygenSaturation => write!(f, "oxygen saturation"),
            Self::Temperature => write!(f, "temperature"),
        }
    }
}

/// Stateless evaluator bound to a set of bands.
#[derive(Debug, Clone, Copy)]
pub struct VitalsAnomalyEvaluator {
    bands: VitalsBands,
}

impl VitalsAnomalyEvaluator {
    pub fn new(bands: VitalsBands) -> Self {
        Self { bands }
    }

    pub fn set_bands(&mut self, bands: VitalsBands) {
        self.bands = bands;
    }

    /// `true` if any present field is outside its band.
    pub fn evaluate(&self, snapshot: &VitalsSnapshot) -> bool {
        evaluate(snapshot, &self.bands)
    }

    /// The first violated band in evaluation order.
    pub fn first_violation(&self, snapshot: &VitalsSnapshot) -> Option<VitalsFlag> {
        first_violation(snapshot, &self.bands)
    }

    /// Bitmask of every violated band.
    pub fn violations(&self, snapshot: &VitalsSnapshot) -> u8 {
        VitalsFlag::ORDER
            .iter()
            .filter(|flag| violates(**flag, snapshot, &self.bands))
            .fold(0, |acc, flag| acc | flag.mask())
    }
}

/// Pure check against explicit bands.
pub fn evaluate(snapshot: &VitalsSnapshot, bands: &VitalsBands) -> bool {
    first_violation(snapshot, bands).is_some()
}

/// Stops at the first violation; a normal or missing field never stops it.
pub fn first_violation(snapshot: &VitalsSnapshot, bands: &VitalsBands) -> Option<VitalsFlag> {
    VitalsFlag::ORDER
        .into_iter()
        .find(|flag| violates(*flag, snapshot, bands))
}

fn violates(flag: VitalsFlag, s: &VitalsSnapshot, b: &VitalsBands) -> bool {
    let outside = |value: Option<f64>, min: f64, max: f64| match value {
        Some(v) if v.is_finite() => v < min || v > max,
        Some(v) => {
            debug!("ignoring non-finite {flag} reading: {v}");
            false
        }
        None => false,
    };

    match flag {
        VitalsFlag::HeartRate => outside(s.heart_rate, b.heart_rate_min, b.heart_rate_max),
        VitalsFlag::SystolicPressure => outside(s.systolic, b.systolic_min, b.systolic_max),
        VitalsFlag::OxygenSaturation => outside(s.spo2, b.spo2_min, f64::INFINITY),
        VitalsFlag::Temperature => {
            outside(s.temperature_f, b.temperature_min_f, b.temperature_max_f)
        }
    }
}
