//! End-to-end orchestration through `EmergencyService::handle`.

use lifeline::app::events::AppEvent;
use lifeline::app::service::EmergencyService;
use lifeline::config::EmergencyConfig;
use lifeline::model::{
    CallState, CandidateKind, CaseId, CloseReason, MotionSample, Severity, VitalsSnapshot,
};
use lifeline::{Event, Status, UserAction};

use super::mock_ports::{MockOutputs, RecordingSink};

// ── Harness ───────────────────────────────────────────────────

struct Harness {
    svc: EmergencyService,
    out: MockOutputs<'static>,
    sink: RecordingSink,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(EmergencyConfig::default())
    }

    fn with_config(config: EmergencyConfig) -> Self {
        let mut svc = EmergencyService::new(config);
        let mut sink = RecordingSink::new();
        svc.start(&mut sink);
        Self {
            svc,
            out: MockOutputs::new(),
            sink,
        }
    }

    fn send(&mut self, event: Event) {
        self.svc.handle(event, &mut self.out, &mut self.sink);
    }

    fn act(&mut self, action: UserAction) {
        self.send(Event::User { action });
    }

    fn manual(&mut self, severity: Option<Severity>) -> CaseId {
        self.send(Event::ManualTrigger {
            kind: CandidateKind::ManualSos,
            severity,
            at_ms: 0,
        });
        self.case_id()
    }

    fn fall(&mut self, at_ms: u64) {
        self.send(Event::Motion(MotionSample::accel(at_ms, 0.0, 0.0, 2.8)));
    }

    fn tick(&mut self, case_id: CaseId, n: u32) {
        for _ in 0..n {
            self.send(Event::CountdownTick { case_id });
        }
    }

    fn case_id(&self) -> CaseId {
        self.svc.current_case().map(|c| c.id).expect("case open")
    }
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn manual_sos_end_to_end() {
    let mut h = Harness::new();
    let id = h.manual(Some(Severity::High));

    // Opened in Detecting, settled in ConfirmedPending with 30 s armed.
    let opened = h.sink.events.iter().find_map(|e| match e {
        AppEvent::CaseOpened { case } => Some(case.clone()),
        _ => None,
    });
    let opened = opened.expect("case opened");
    assert_eq!(opened.status, Status::Detecting);
    assert_eq!(opened.severity, Severity::High);
    assert!(h.sink.events.contains(&AppEvent::CountdownStarted {
        case_id: id,
        seconds: 30
    }));
    assert_eq!(h.svc.state(), Status::ConfirmedPending);

    h.tick(id, 29);
    assert_eq!(h.svc.state(), Status::ConfirmedPending);
    assert_eq!(h.svc.current_case().unwrap().seconds_remaining, 1);
    assert!(h.out.calls.is_empty());

    h.tick(id, 1);
    assert_eq!(h.svc.state(), Status::Responding);
    assert_eq!(h.out.calls.len(), 1);
    assert_eq!(h.out.calls[0].phone_number, "911");
    assert_eq!(h.out.calls[0].case_id, id);
    assert_eq!(h.sink.calls().len(), 1);
    assert_eq!(h.svc.call_state(id), CallState::InProgress);

    h.send(Event::CallEnded { case_id: id });
    assert_eq!(h.svc.state(), Status::Resolved);
    let case = h.svc.current_case().unwrap();
    assert_eq!(case.status, Status::Resolved);
    assert_eq!(case.call_state, CallState::Ended);

    assert_eq!(
        h.sink.transitions(),
        [
            (Status::Idle, Status::ConfirmedPending),
            (Status::ConfirmedPending, Status::Responding),
            (Status::Responding, Status::Resolved),
        ]
    );
}

#[test]
fn countdown_expires_exactly_once() {
    let mut h = Harness::new();
    let id = h.manual(None);
    h.tick(id, 45);
    assert_eq!(h.out.calls.len(), 1);
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::Escalated { .. })),
        1
    );
}

#[test]
fn dismiss_at_seventeen_never_calls() {
    let mut h = Harness::new();
    let id = h.manual(None);
    h.tick(id, 13);
    assert_eq!(h.svc.current_case().unwrap().seconds_remaining, 17);

    h.act(UserAction::Dismiss);
    assert_eq!(h.svc.state(), Status::Idle);
    assert!(h.svc.current_case().is_none());
    assert_eq!(h.svc.armed_countdown(), None);

    let closed = h.sink.events.iter().find_map(|e| match e {
        AppEvent::CaseClosed {
            case,
            final_status,
            reason,
        } => Some((case.id, *final_status, *reason)),
        _ => None,
    });
    assert_eq!(closed, Some((id, Status::FalseAlarm, CloseReason::Dismissed)));

    // Ticks already queued for the old case are no-ops.
    h.sink.clear();
    h.tick(id, 40);
    assert!(h.sink.events.is_empty());
    assert!(h.out.calls.is_empty());
}

#[test]
fn notification_dismiss_action_maps_to_dismiss() {
    let mut h = Harness::new();
    h.manual(None);
    let action = UserAction::from_notification_action("DISMISS").unwrap();
    h.act(action);
    assert_eq!(h.svc.state(), Status::Idle);
}

#[test]
fn duplicate_candidates_do_not_open_or_reset() {
    let mut h = Harness::new();
    h.fall(1_000);
    let id = h.case_id();
    h.tick(id, 5);

    // Another fall outside the debounce window plus a hard shake.
    h.fall(7_000);
    h.send(Event::Motion(MotionSample::accel(7_100, 2.0, 2.0, 2.0)));
    h.manual(Some(Severity::Critical));

    assert_eq!(h.case_id(), id);
    assert_eq!(h.svc.current_case().unwrap().seconds_remaining, 25);
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::CaseOpened { .. })),
        1
    );
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::CandidateIgnored { .. })),
        3
    );
}

#[test]
fn shake_while_responding_is_ignored() {
    let mut h = Harness::new();
    let id = h.manual(None);
    h.act(UserAction::Confirm);
    h.send(Event::Motion(MotionSample::accel(50, 0.0, 0.0, 3.5)));
    assert_eq!(h.svc.state(), Status::Responding);
    assert_eq!(h.case_id(), id);
    assert_eq!(h.out.calls.len(), 1);
}

#[test]
fn fall_burst_opens_single_case() {
    let mut h = Harness::new();
    for t in (0..4_000).step_by(20) {
        h.fall(t);
    }
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::CaseOpened { .. })),
        1
    );
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::CandidateIgnored { .. })),
        0
    );
}

#[test]
fn foreign_call_ended_leaves_call_state() {
    let mut h = Harness::new();
    let id = h.manual(None);
    h.act(UserAction::Confirm);

    h.send(Event::CallEnded {
        case_id: CaseId(id.0 + 7),
    });
    assert_eq!(h.svc.state(), Status::Responding);
    assert_eq!(h.svc.current_case().unwrap().call_state, CallState::InProgress);
    assert_eq!(h.svc.call_state(id), CallState::InProgress);
}

#[test]
fn call_ended_after_clear_is_stale() {
    let mut h = Harness::new();
    let id = h.manual(None);
    h.act(UserAction::Confirm);
    h.send(Event::CallEnded { case_id: id });
    h.act(UserAction::Clear);
    assert_eq!(h.svc.state(), Status::Idle);

    h.sink.clear();
    h.send(Event::CallEnded { case_id: id });
    assert!(h.sink.events.is_empty());
}

#[test]
fn get_help_clears_without_call() {
    let mut h = Harness::new();
    let id = h.manual(None);
    h.tick(id, 3);
    h.act(UserAction::GetHelp);

    assert_eq!(h.svc.state(), Status::Idle);
    assert!(h.out.calls.is_empty());
    assert!(h.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::CaseClosed {
            reason: CloseReason::AssistanceRequested,
            ..
        }
    )));
}

#[test]
fn dismiss_and_confirm_ignored_while_responding() {
    let mut h = Harness::new();
    h.manual(None);
    h.act(UserAction::Confirm);
    h.act(UserAction::Dismiss);
    h.act(UserAction::Confirm);
    assert_eq!(h.svc.state(), Status::Responding);
    assert_eq!(h.out.calls.len(), 1);
}

#[test]
fn resolved_record_cleared_explicitly() {
    let mut h = Harness::new();
    let id = h.manual(None);
    h.act(UserAction::Confirm);
    h.send(Event::CallEnded { case_id: id });

    h.tick(id, 3);
    assert_eq!(h.svc.current_case().unwrap().status, Status::Resolved);

    h.act(UserAction::Clear);
    assert_eq!(h.svc.state(), Status::Idle);
    assert!(h.svc.current_case().is_none());
    assert_eq!(h.svc.call_state(id), CallState::None);
}

#[test]
fn candidate_after_resolution_opens_new_case() {
    let mut h = Harness::new();
    let first = h.manual(None);
    h.act(UserAction::Confirm);
    h.send(Event::CallEnded { case_id: first });

    h.fall(60_000);
    let second = h.case_id();
    assert_ne!(first, second);
    assert_eq!(h.svc.state(), Status::ConfirmedPending);
    assert!(h.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::CaseClosed {
            reason: CloseReason::Superseded,
            ..
        }
    )));
}

#[test]
fn abnormal_vitals_open_case_and_alert() {
    let mut h = Harness::new();
    h.send(Event::Vitals(VitalsSnapshot {
        heart_rate: Some(120.0),
        spo2: Some(95.0),
        timestamp_ms: 10,
        ..Default::default()
    }));
    let case = h.svc.current_case().unwrap();
    assert_eq!(case.kind, CandidateKind::VitalsAbnormal);
    assert_eq!(case.severity, Severity::Medium);
    assert_eq!(h.out.alerts.len(), 3);
}

#[test]
fn shorter_countdown_from_config() {
    let mut config = EmergencyConfig::default();
    config.countdown_secs = 5;
    let mut h = Harness::with_config(config);
    let id = h.manual(None);
    h.tick(id, 5);
    assert_eq!(h.svc.state(), Status::Responding);
}
