//! Outbound application events.
//!
//! The [`EmergencyService`](super::service::EmergencyService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them: render the countdown, log,
//! forward to a history store, etc.

use serde::Serialize;

use crate::alerts::{AlertChannel, AlertIntent};
use crate::call_gate::CallIntent;
use crate::error::DeliveryError;
use crate::fsm::Status;
use crate::model::{CandidateKind, CaseId, CloseReason, EmergencyCase};

/// Which collaborator a failed delivery was meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeliveryTarget {
    Alert(AlertChannel),
    Dialer,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started { state: Status },

    /// The orchestrator moved between settled states.
    StateChanged { from: Status, to: Status },

    CaseOpened { case: EmergencyCase },
    CountdownStarted { case_id: CaseId, seconds: u32 },
    CountdownTick { case_id: CaseId, remaining: u32 },
    Escalated { case: EmergencyCase },
    CaseResolved { case: EmergencyCase },

    /// A case left the orchestrator.  `final_status` is the terminal
    /// status reported for it (`FalseAlarm` on dismissal).
    CaseClosed {
        case: EmergencyCase,
        final_status: Status,
        reason: CloseReason,
    },

    /// A candidate arrived while a case was open.
    CandidateIgnored { kind: CandidateKind, open_case: CaseId },

    /// An alert intent was handed to the alert port.
    Alert { intent: AlertIntent },

    /// A dial request was handed to the dialer port.
    Call { intent: CallIntent },

    /// Non-fatal: a collaborator failed to take an intent.
    DeliveryFailed {
        case_id: CaseId,
        target: DeliveryTarget,
        error: DeliveryError,
    },
}
