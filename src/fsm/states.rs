//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers, no closures, no dynamic
//! dispatch.  Handlers only touch the [`OrchestratorContext`]; side effects
//! leave through the outbox.
//!
//! ```text
//!  IDLE ──[candidate]──▶ DETECTING ──(eventless)──▶ CONFIRMED_PENDING
//!   ▲                        │                         │   │    │
//!   │                   [get help]          [dismiss]  │   │  [tick → 0 / confirm]
//!   │◀───────────────────────┘                  ▼      │   │    ▼
//!   │◀──────(eventless)────────────────── FALSE_ALARM  │   │  RESPONDING
//!   │◀──────────────────[get help]─────────────────────┘   │    │
//!   │                                                      │  [call ended]
//!   │                                                      │    ▼
//!   └──────────────────────[clear]──────────────────────── RESOLVED
//!                                                 [candidate] → DETECTING
//! ```

use super::context::{OrchestratorContext, Stimulus, Transition};
use super::{StateDescriptor, Status};
use crate::app::commands::UserAction;
use crate::countdown::TickOutcome;
use crate::model::{CallState, CloseReason};
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table.  Called once per orchestrator.
pub fn build_state_table() -> [StateDescriptor; Status::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: Status::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Detecting
        StateDescriptor {
            id: Status::Detecting,
            name: "Detecting",
            on_enter: Some(detecting_enter),
            on_exit: None,
            on_update: detecting_update,
        },
        // Index 2: ConfirmedPending
        StateDescriptor {
            id: Status::ConfirmedPending,
            name: "ConfirmedPending",
            on_enter: Some(pending_enter),
            on_exit: Some(pending_exit),
            on_update: pending_update,
        },
        // Index 3: Responding
        StateDescriptor {
            id: Status::Responding,
            name: "Responding",
            on_enter: Some(responding_enter),
            on_exit: None,
            on_update: responding_update,
        },
        // Index 4: Resolved
        StateDescriptor {
            id: Status::Resolved,
            name: "Resolved",
            on_enter: Some(resolved_enter),
            on_exit: None,
            on_update: resolved_update,
        },
        // Index 5: FalseAlarm
        StateDescriptor {
            id: Status::FalseAlarm,
            name: "FalseAlarm",
            on_enter: Some(false_alarm_enter),
            on_exit: None,
            on_update: false_alarm_update,
        },
    ]
}

fn set_status(ctx: &mut OrchestratorContext, status: Status) {
    if let Some(case) = ctx.case.as_mut() {
        case.status = status;
    }
}

fn ignore_candidate(ctx: &mut OrchestratorContext, stimulus: Stimulus) {
    if let (Stimulus::Candidate(c), Some(open)) = (stimulus, ctx.case_id()) {
        info!("{} candidate ignored, {} already open", c.kind, open);
        ctx.push(Transition::CandidateIgnored {
            kind: c.kind,
            open_case: open,
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut OrchestratorContext) {
    ctx.countdown.disarm();
    info!("IDLE: monitoring");
}

fn idle_update(ctx: &mut OrchestratorContext) -> Option<Status> {
    match ctx.take_stimulus()? {
        Stimulus::Candidate(candidate) => {
            ctx.open_case(&candidate);
            Some(Status::Detecting)
        }
        other => {
            debug!("IDLE: {:?} has no effect", other);
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  DETECTING state: a case was just opened
// ═══════════════════════════════════════════════════════════════════════════

fn detecting_enter(ctx: &mut OrchestratorContext) {
    set_status(ctx, Status::Detecting);
    if let Some(case) = ctx.case.clone() {
        info!("DETECTING: {} ({})", case.id, case.description);
        ctx.push(Transition::CaseOpened(case));
    }
}

fn detecting_update(ctx: &mut OrchestratorContext) -> Option<Status> {
    match ctx.take_stimulus() {
        None => Some(Status::ConfirmedPending),
        Some(Stimulus::Action(UserAction::Dismiss)) => Some(Status::FalseAlarm),
        Some(Stimulus::Action(UserAction::GetHelp)) => {
            ctx.close_case(CloseReason::AssistanceRequested);
            Some(Status::Idle)
        }
        Some(stimulus @ Stimulus::Candidate(_)) => {
            ignore_candidate(ctx, stimulus);
            Some(Status::ConfirmedPending)
        }
        Some(_) => Some(Status::ConfirmedPending),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONFIRMED_PENDING state: countdown running, user may cancel
// ═══════════════════════════════════════════════════════════════════════════

fn pending_enter(ctx: &mut OrchestratorContext) {
    let secs = ctx.config.countdown_secs;
    let Some(case) = ctx.case.as_mut() else {
        warn!("CONFIRMED_PENDING: entered without a case");
        return;
    };
    case.status = Status::ConfirmedPending;
    case.seconds_remaining = secs;
    let case_id = case.id;

    ctx.countdown.arm(case_id, secs);
    ctx.push(Transition::CountdownStarted {
        case_id,
        seconds: secs,
    });
}

fn pending_exit(ctx: &mut OrchestratorContext) {
    ctx.countdown.disarm();
}

fn pending_update(ctx: &mut OrchestratorContext) -> Option<Status> {
    match ctx.take_stimulus()? {
        Stimulus::Tick(id) => match ctx.countdown.tick(id) {
            TickOutcome::Stale => None,
            TickOutcome::Running(remaining) => {
                if let Some(case) = ctx.case.as_mut() {
                    case.seconds_remaining = remaining;
                }
                ctx.push(Transition::CountdownTick {
                    case_id: id,
                    remaining,
                });
                None
            }
            TickOutcome::Expired => {
                if let Some(case) = ctx.case.as_mut() {
                    case.seconds_remaining = 0;
                }
                info!("CONFIRMED_PENDING: countdown expired for {}", id);
                Some(Status::Responding)
            }
        },
        Stimulus::Action(UserAction::Confirm) => {
            info!("CONFIRMED_PENDING: user confirmed, escalating now");
            Some(Status::Responding)
        }
        Stimulus::Action(UserAction::Dismiss) => Some(Status::FalseAlarm),
        Stimulus::Action(UserAction::GetHelp) => {
            info!("CONFIRMED_PENDING: first-aid guidance requested");
            ctx.close_case(CloseReason::AssistanceRequested);
            Some(Status::Idle)
        }
        stimulus @ Stimulus::Candidate(_) => {
            ignore_candidate(ctx, stimulus);
            None
        }
        other => {
            debug!("CONFIRMED_PENDING: {:?} has no effect", other);
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  RESPONDING state: call requested, waiting for it to end
// ═══════════════════════════════════════════════════════════════════════════

fn responding_enter(ctx: &mut OrchestratorContext) {
    let Some(case) = ctx.case.as_mut() else {
        warn!("RESPONDING: entered without a case");
        return;
    };
    case.status = Status::Responding;
    case.call_state = CallState::InProgress;
    let snapshot = case.clone();
    warn!("RESPONDING: escalating {} ({})", snapshot.id, snapshot.kind);
    ctx.push(Transition::Escalated(snapshot));
}

fn responding_update(ctx: &mut OrchestratorContext) -> Option<Status> {
    match ctx.take_stimulus()? {
        Stimulus::CallEnded(id) if ctx.case_id() == Some(id) => {
            if let Some(case) = ctx.case.as_mut() {
                case.call_state = CallState::Ended;
            }
            Some(Status::Resolved)
        }
        stimulus @ Stimulus::Candidate(_) => {
            ignore_candidate(ctx, stimulus);
            None
        }
        other => {
            debug!("RESPONDING: {:?} has no effect", other);
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  RESOLVED state: record retained until cleared or superseded
// ═══════════════════════════════════════════════════════════════════════════

fn resolved_enter(ctx: &mut OrchestratorContext) {
    set_status(ctx, Status::Resolved);
    if let Some(case) = ctx.case.clone() {
        info!("RESOLVED: {}", case.id);
        ctx.push(Transition::Resolved(case));
    }
}

fn resolved_update(ctx: &mut OrchestratorContext) -> Option<Status> {
    match ctx.take_stimulus()? {
        Stimulus::Action(UserAction::Clear) => {
            ctx.close_case(CloseReason::Cleared);
            Some(Status::Idle)
        }
        Stimulus::Candidate(candidate) => {
            ctx.close_case(CloseReason::Superseded);
            ctx.open_case(&candidate);
            Some(Status::Detecting)
        }
        other => {
            debug!("RESOLVED: {:?} has no effect", other);
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  FALSE_ALARM state: user dismissed, report then return to idle
// ═══════════════════════════════════════════════════════════════════════════

fn false_alarm_enter(ctx: &mut OrchestratorContext) {
    ctx.countdown.disarm();
    set_status(ctx, Status::FalseAlarm);
    info!("FALSE_ALARM: dismissed by user");
    ctx.close_case(CloseReason::Dismissed);
}

fn false_alarm_update(_ctx: &mut OrchestratorContext) -> Option<Status> {
    Some(Status::Idle)
}
