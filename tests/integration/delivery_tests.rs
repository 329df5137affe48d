//! Alert and call delivery: channel planning, contact push, failures.

use lifeline::alerts::{AlertChannel, AlertPayload};
use lifeline::app::events::{AppEvent, DeliveryTarget};
use lifeline::app::service::EmergencyService;
use lifeline::config::{EmergencyConfig, EmergencyContact};
use lifeline::error::DeliveryError;
use lifeline::model::CandidateKind;
use lifeline::{Event, Status, UserAction};

use super::mock_ports::{MockOutputs, RecordingSink};

fn start(config: EmergencyConfig) -> (EmergencyService, RecordingSink) {
    let mut svc = EmergencyService::new(config);
    let mut sink = RecordingSink::new();
    svc.start(&mut sink);
    (svc, sink)
}

fn manual() -> Event {
    Event::ManualTrigger {
        kind: CandidateKind::ManualSos,
        severity: None,
        at_ms: 0,
    }
}

fn contact(name: &str, is_primary: bool) -> EmergencyContact {
    EmergencyContact {
        name: name.into(),
        phone_number: "+15550123".into(),
        relationship: "sibling".into(),
        is_primary,
    }
}

#[test]
fn open_alerts_in_channel_order() {
    let (mut svc, mut sink) = start(EmergencyConfig::default());
    let mut out = MockOutputs::new();
    svc.handle(manual(), &mut out, &mut sink);

    assert_eq!(
        out.channels(),
        [
            AlertChannel::Voice,
            AlertChannel::Haptic,
            AlertChannel::LocalNotification
        ]
    );
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Alert { .. })), 3);
}

#[test]
fn primary_contact_receives_push() {
    let mut config = EmergencyConfig::default();
    config.contacts = vec![contact("Sam", true), contact("Lee", false)];
    let (mut svc, mut sink) = start(config);
    let mut out = MockOutputs::new();
    svc.handle(manual(), &mut out, &mut sink);

    let push = out
        .alerts
        .iter()
        .find(|a| a.channel == AlertChannel::ContactPush)
        .expect("contact push planned");
    match &push.payload {
        AlertPayload::ContactPush { recipients, title, .. } => {
            assert_eq!(title, "Emergency Alert");
            assert_eq!(recipients.len(), 1);
            assert_eq!(recipients[0].name, "Sam");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn failed_channel_does_not_block_others_or_roll_back() {
    let (mut svc, mut sink) = start(EmergencyConfig::default());
    let mut out = MockOutputs::new();
    out.failing = vec![AlertChannel::Voice];
    svc.handle(manual(), &mut out, &mut sink);

    // All three were attempted.
    assert_eq!(out.alerts.len(), 3);
    assert_eq!(svc.state(), Status::ConfirmedPending);
    let failures: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::DeliveryFailed { target, error, .. } => Some((*target, *error)),
            _ => None,
        })
        .collect();
    assert_eq!(
        failures,
        [(
            DeliveryTarget::Alert(AlertChannel::Voice),
            DeliveryError::Unavailable
        )]
    );
}

#[test]
fn dialer_failure_keeps_case_responding() {
    let (mut svc, mut sink) = start(EmergencyConfig::default());
    let mut out = MockOutputs::new();
    out.dialer_fails = true;
    svc.handle(manual(), &mut out, &mut sink);
    svc.handle(
        Event::User {
            action: UserAction::Confirm,
        },
        &mut out,
        &mut sink,
    );

    assert_eq!(svc.state(), Status::Responding);
    assert_eq!(out.calls.len(), 1);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::DeliveryFailed {
            target: DeliveryTarget::Dialer,
            error: DeliveryError::PermissionDenied,
            ..
        }
    )));
    // Escalation alerts still went out after the failed dial.
    assert!(out.channels().ends_with(&[
        AlertChannel::Voice,
        AlertChannel::LocalNotification
    ]));
}

#[test]
fn escalation_announces_the_call() {
    let (mut svc, mut sink) = start(EmergencyConfig::default());
    let mut out = MockOutputs::new();
    svc.handle(manual(), &mut out, &mut sink);
    out.alerts.clear();
    svc.handle(
        Event::User {
            action: UserAction::Confirm,
        },
        &mut out,
        &mut sink,
    );

    let texts: Vec<String> = out
        .alerts
        .iter()
        .filter_map(|a| match &a.payload {
            AlertPayload::Speech { text, .. } => Some(text.clone()),
            AlertPayload::LocalNotification { body, .. } => Some(body.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(texts[0], "Calling 911 now.");
    assert!(texts[1].contains("Emergency services have been notified."));
}

#[test]
fn silent_preferences_keep_notification() {
    let mut config = EmergencyConfig::default();
    config.preferences.enable_voice_alerts = false;
    config.preferences.enable_haptic_feedback = false;
    let (mut svc, mut sink) = start(config);
    let mut out = MockOutputs::new();
    svc.handle(manual(), &mut out, &mut sink);
    assert_eq!(out.channels(), [AlertChannel::LocalNotification]);
}
