//! Call gate: the only component that asks for an emergency call.
//!
//! Holds the call state of at most one case.  A call-ended signal is passed
//! on to the orchestrator only when it names the currently open case;
//! anything else is a dangling callback and is dropped.

use log::{debug, info};
use serde::Serialize;

use crate::model::{CallState, CandidateKind, CaseId, EmergencyCase};

/// Dial request handed to the dialer collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallIntent {
    pub case_id: CaseId,
    pub phone_number: String,
}

pub struct CallGate {
    emergency_number: String,
    active: Option<(CaseId, CallState)>,
}

impl CallGate {
    pub fn new(emergency_number: &str) -> Self {
        Self {
            emergency_number: emergency_number.into(),
            active: None,
        }
    }

    pub fn set_emergency_number(&mut self, number: &str) {
        self.emergency_number = number.into();
    }

    /// Number to dial for an emergency kind.  Every kind routes to the
    /// configured emergency number.
    pub fn number_for(&self, _kind: CandidateKind) -> &str {
        &self.emergency_number
    }

    /// Mark the case's call in progress and produce the dial request.
    /// Returns `None` if a call was already requested for this case.
    pub fn request_call(&mut self, case: &EmergencyCase) -> Option<CallIntent> {
        if let Some((id, state)) = self.active {
            if id == case.id && state != CallState::None {
                debug!("CallGate: call for {} already {:?}", id, state);
                return None;
            }
        }

        let phone_number = self.number_for(case.kind).to_owned();
        info!("CallGate: requesting call to {} for {}", phone_number, case.id);
        self.active = Some((case.id, CallState::InProgress));
        Some(CallIntent {
            case_id: case.id,
            phone_number,
        })
    }

    /// Record that the call for `case_id` ended.  Returns `true` only when
    /// the orchestrator should be told, i.e. the id matches `open_case`
    /// and the gate placed a call for it.
    pub fn on_call_ended(&mut self, case_id: CaseId, open_case: Option<CaseId>) -> bool {
        if open_case != Some(case_id) {
            debug!("CallGate: call-ended for {} is stale, ignored", case_id);
            return false;
        }
        match self.active {
            Some((id, CallState::InProgress)) if id == case_id => {
                info!("CallGate: call for {} ended", case_id);
                self.active = Some((id, CallState::Ended));
                true
            }
            _ => {
                debug!("CallGate: no call in progress for {}, ignored", case_id);
                false
            }
        }
    }

    pub fn call_state(&self, case_id: CaseId) -> CallState {
        match self.active {
            Some((id, state)) if id == case_id => state,
            _ => CallState::None,
        }
    }

    /// Forget the call state of a closed case.
    pub fn release(&mut self, case_id: CaseId) {
        if matches!(self.active, Some((id, _)) if id == case_id) {
            self.active = None;
        }
    }
}
