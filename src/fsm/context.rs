//! Shared mutable context threaded through every FSM handler.
//!
//! `OrchestratorContext` is the blackboard the state handlers read from and
//! write to.  It holds the one open [`EmergencyCase`], the countdown, the
//! stimulus currently being dispatched and an outbox of [`Transition`]s the
//! application service drains after every dispatch.  Handlers never talk
//! to alert or call adapters directly.

use heapless::Vec;
use log::{info, warn};

use crate::app::commands::UserAction;
use crate::config::EmergencyConfig;
use crate::countdown::Countdown;
use crate::model::{CandidateKind, Candidate, CaseId, CloseReason, EmergencyCase};

// ---------------------------------------------------------------------------
// Stimulus (input to one dispatch)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stimulus {
    Candidate(Candidate),
    Action(UserAction),
    /// One elapsed countdown second, tagged with the case it was armed for.
    Tick(CaseId),
    /// The dialer reported that the call for this case ended.
    CallEnded(CaseId),
}

// ---------------------------------------------------------------------------
// Transition records (output of one dispatch)
// ---------------------------------------------------------------------------

/// Observable effects produced by state handlers, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    CaseOpened(EmergencyCase),
    CountdownStarted { case_id: CaseId, seconds: u32 },
    CountdownTick { case_id: CaseId, remaining: u32 },
    /// Hand-off to the call gate.  Emitted at most once per case.
    Escalated(EmergencyCase),
    Resolved(EmergencyCase),
    CaseClosed { case: EmergencyCase, reason: CloseReason },
    CandidateIgnored { kind: CandidateKind, open_case: CaseId },
}

/// One dispatch produces at most a handful of transitions.
pub const OUTBOX_CAPACITY: usize = 8;

// ---------------------------------------------------------------------------
// OrchestratorContext
// ---------------------------------------------------------------------------

pub struct OrchestratorContext {
    pub config: EmergencyConfig,
    /// The single open case.  `None` exactly while idle.
    pub case: Option<EmergencyCase>,
    /// Set by the caller before `Fsm::dispatch`, consumed by the handler.
    pub stimulus: Option<Stimulus>,
    pub countdown: Countdown,
    pub outbox: Vec<Transition, OUTBOX_CAPACITY>,
    next_case_id: u32,
}

impl OrchestratorContext {
    pub fn new(config: EmergencyConfig) -> Self {
        Self {
            config,
            case: None,
            stimulus: None,
            countdown: Countdown::new(),
            outbox: Vec::new(),
            next_case_id: 1,
        }
    }

    /// Take the pending stimulus, leaving `None`.
    pub fn take_stimulus(&mut self) -> Option<Stimulus> {
        self.stimulus.take()
    }

    /// Queue a transition for the application service.
    pub fn push(&mut self, transition: Transition) {
        if let Err(dropped) = self.outbox.push(transition) {
            warn!("FSM outbox full, dropping {:?}", dropped);
        }
    }

    /// Create a fresh case from `candidate` with the next id.
    pub fn open_case(&mut self, candidate: &Candidate) -> CaseId {
        let id = CaseId(self.next_case_id);
        self.next_case_id = self.next_case_id.wrapping_add(1);
        info!(
            "Opening {} for {} (severity {})",
            id,
            candidate.kind,
            candidate.severity()
        );
        self.case = Some(EmergencyCase::open(id, candidate));
        id
    }

    /// Remove the open case and record why.
    pub fn close_case(&mut self, reason: CloseReason) {
        self.countdown.disarm();
        if let Some(case) = self.case.take() {
            info!("Closing {} ({:?})", case.id, reason);
            self.push(Transition::CaseClosed { case, reason });
        }
    }

    pub fn case_id(&self) -> Option<CaseId> {
        self.case.as_ref().map(|c| c.id)
    }
}
