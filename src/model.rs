//! Domain data model: samples, snapshots, candidates and the emergency case.
//!
//! Samples and snapshots are immutable values produced by the outside
//! world.  A [`Candidate`] is transient: it is handed to the orchestrator
//! and either opens a case or is dropped.  The [`EmergencyCase`] is the
//! only mutable aggregate and is owned by the orchestrator's FSM context.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::VitalsBands;
use crate::detect::vitals;
use crate::fsm::Status;

/// Milliseconds on the caller's monotonic clock.
pub type Millis = u64;

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

/// Three-axis vector (g for acceleration, rad/s for rotation rate).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One timestamped motion reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub timestamp_ms: Millis,
    pub acceleration: Vec3,
    #[serde(default)]
    pub rotation_rate: Vec3,
}

impl MotionSample {
    /// Acceleration-only sample (rotation rate zero).
    pub const fn accel(timestamp_ms: Millis, x: f64, y: f64, z: f64) -> Self {
        Self {
            timestamp_ms,
            acceleration: Vec3::new(x, y, z),
            rotation_rate: Vec3::new(0.0, 0.0, 0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Vitals
// ---------------------------------------------------------------------------

/// Point-in-time vital signs.  `None` models sensor or permission absence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsSnapshot {
    pub heart_rate: Option<f64>,
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    pub spo2: Option<f64>,
    pub temperature_f: Option<f64>,
    pub resp_rate: Option<f64>,
    pub timestamp_ms: Millis,
}

impl VitalsSnapshot {
    /// Abnormal against the fixed default bands.  Missing fields never
    /// contribute.
    pub fn is_abnormal(&self) -> bool {
        vitals::evaluate(self, &VitalsBands::default())
    }
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        })
    }
}

/// What kind of signal produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CandidateKind {
    Fall,
    ShakeSos,
    VitalsAbnormal,
    ManualSos,
}

impl CandidateKind {
    /// Severity a case opened from this kind starts with.
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::Fall | Self::ManualSos => Severity::High,
            Self::ShakeSos | Self::VitalsAbnormal => Severity::Medium,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fall => "fall",
            Self::ShakeSos => "shake SOS",
            Self::VitalsAbnormal => "abnormal vitals",
            Self::ManualSos => "manual SOS",
        }
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An unconfirmed signal that might represent an emergency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub detected_at_ms: Millis,
    /// Only honoured for [`CandidateKind::ManualSos`].
    pub severity_hint: Option<Severity>,
}

impl Candidate {
    pub const fn detected(kind: CandidateKind, detected_at_ms: Millis) -> Self {
        Self {
            kind,
            detected_at_ms,
            severity_hint: None,
        }
    }

    pub const fn manual(severity: Option<Severity>, detected_at_ms: Millis) -> Self {
        Self {
            kind: CandidateKind::ManualSos,
            detected_at_ms,
            severity_hint: severity,
        }
    }

    /// Severity the case will be opened with.
    pub fn severity(&self) -> Severity {
        match self.kind {
            CandidateKind::ManualSos => self
                .severity_hint
                .unwrap_or(CandidateKind::ManualSos.default_severity()),
            kind => kind.default_severity(),
        }
    }
}

// ---------------------------------------------------------------------------
// Case
// ---------------------------------------------------------------------------

/// Identity of one emergency case.  Monotonic per orchestrator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaseId(pub u32);

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "case#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallState {
    None,
    InProgress,
    Ended,
}

/// Why a case left the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloseReason {
    /// User dismissed the countdown ("I'm OK").  Reported as `FalseAlarm`.
    Dismissed,
    /// User chose first-aid guidance instead of a call.
    AssistanceRequested,
    /// Caller acknowledged a resolved case.
    Cleared,
    /// A resolved record was replaced by a new case.
    Superseded,
}

/// The single authoritative in-progress emergency record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergencyCase {
    pub id: CaseId,
    pub kind: CandidateKind,
    pub opened_at_ms: Millis,
    pub severity: Severity,
    pub status: Status,
    pub seconds_remaining: u32,
    pub call_state: CallState,
    pub description: String,
}

impl EmergencyCase {
    pub(crate) fn open(id: CaseId, candidate: &Candidate) -> Self {
        let description = match candidate.kind {
            CandidateKind::Fall => "Fall detected by motion sensors",
            CandidateKind::ShakeSos => "SOS shake gesture detected",
            CandidateKind::VitalsAbnormal => "Vital signs outside normal ranges",
            CandidateKind::ManualSos => "Manual SOS requested",
        };
        Self {
            id,
            kind: candidate.kind,
            opened_at_ms: candidate.detected_at_ms,
            severity: candidate.severity(),
            status: Status::Detecting,
            seconds_remaining: 0,
            call_state: CallState::None,
            description: description.into(),
        }
    }
}
