//! Runtime driver: queue draining and the live ticker loop.

use std::time::Instant;

use embassy_time::Duration;
use lifeline::app::service::EmergencyService;
use lifeline::config::EmergencyConfig;
use lifeline::model::{CallState, CandidateKind, MotionSample, Severity};
use lifeline::runtime::Runtime;
use lifeline::{Event, EventQueue, Status, UserAction};

use super::mock_ports::{MockOutputs, RecordingSink};

fn service(config: EmergencyConfig) -> (EmergencyService, RecordingSink) {
    let mut svc = EmergencyService::new(config);
    let mut sink = RecordingSink::new();
    svc.start(&mut sink);
    (svc, sink)
}

#[test]
fn drain_processes_in_arrival_order() {
    let queue = EventQueue::new();
    let runtime = Runtime::new(&queue);
    let (mut svc, mut sink) = service(EmergencyConfig::default());
    let mut out = MockOutputs::new();

    // Dismiss before the trigger is a no-op; the trigger then opens a case.
    queue.submit_user_action(UserAction::Dismiss);
    queue.submit_manual_trigger(CandidateKind::ManualSos, Some(Severity::High), 0);
    assert_eq!(runtime.drain_pending(&mut svc, &mut out, &mut sink), 2);

    assert_eq!(svc.state(), Status::ConfirmedPending);
    let id = svc.current_case().unwrap().id;
    assert_eq!(runtime.armed(), Some(id));
    assert!(queue.is_empty());
}

#[test]
fn cancel_ahead_of_queued_tick_wins() {
    let queue = EventQueue::new();
    let runtime = Runtime::new(&queue);
    let (mut svc, mut sink) = service(EmergencyConfig::default());
    let mut out = MockOutputs::new();

    queue.submit_manual_trigger(CandidateKind::ManualSos, None, 0);
    runtime.drain_pending(&mut svc, &mut out, &mut sink);
    let id = runtime.armed().unwrap();

    // Dismiss lands in the queue ahead of ticks already produced.
    queue.submit_user_action(UserAction::Dismiss);
    for _ in 0..40 {
        queue.push(Event::CountdownTick { case_id: id });
    }
    runtime.drain_pending(&mut svc, &mut out, &mut sink);

    assert_eq!(svc.state(), Status::Idle);
    assert_eq!(runtime.armed(), None);
    assert!(out.calls.is_empty());
}

#[test]
fn drain_stops_at_shutdown() {
    let queue = EventQueue::new();
    let runtime = Runtime::new(&queue);
    let (mut svc, mut sink) = service(EmergencyConfig::default());
    let mut out = MockOutputs::new();

    queue.submit_motion_sample(MotionSample::accel(0, 0.0, 0.0, 1.0));
    queue.request_shutdown();
    queue.submit_manual_trigger(CandidateKind::ManualSos, None, 0);

    assert_eq!(runtime.drain_pending(&mut svc, &mut out, &mut sink), 1);
    assert_eq!(svc.state(), Status::Idle);
    assert_eq!(queue.len(), 1);
}

#[test]
fn live_ticker_escalates_and_resolves() {
    let mut config = EmergencyConfig::default();
    config.countdown_secs = 2;
    let queue = EventQueue::new();
    let runtime = Runtime::new(&queue).with_tick_period(Duration::from_millis(10));
    let (mut svc, mut sink) = service(config);
    // The dialer answers with call-ended and then stops the runtime.
    let mut out = MockOutputs::hanging_up_via(&queue);

    queue.submit_manual_trigger(CandidateKind::ManualSos, None, 0);
    runtime.run_blocking(&mut svc, &mut out, &mut sink);

    assert_eq!(svc.state(), Status::Resolved);
    assert_eq!(out.calls.len(), 1);
    let case = svc.current_case().unwrap();
    assert_eq!(case.call_state, CallState::Ended);
    assert_eq!(
        sink.transitions(),
        [
            (Status::Idle, Status::ConfirmedPending),
            (Status::ConfirmedPending, Status::Responding),
            (Status::Responding, Status::Resolved),
        ]
    );
}

#[test]
fn live_countdown_runs_full_periods_after_arming() {
    let period = Duration::from_millis(40);
    let mut config = EmergencyConfig::default();
    config.countdown_secs = 3;
    let queue = EventQueue::new();
    let runtime = Runtime::new(&queue).with_tick_period(period);
    let (mut svc, mut sink) = service(config);
    let mut out = MockOutputs::hanging_up_via(&queue);

    let submitted = std::thread::scope(|scope| {
        let feeder = scope.spawn(|| {
            // Arm just before the runtime's first tick would fire.
            std::thread::sleep(std::time::Duration::from_millis(38));
            let at = Instant::now();
            queue.submit_manual_trigger(CandidateKind::ManualSos, None, 38);
            at
        });
        runtime.run_blocking(&mut svc, &mut out, &mut sink);
        feeder.join().unwrap()
    });

    assert_eq!(out.calls.len(), 1);
    let elapsed = out.dialed_at.unwrap() - submitted;
    assert!(
        elapsed >= std::time::Duration::from_millis(3 * 40),
        "3 x 40 ms countdown escalated after {elapsed:?}"
    );
    assert_eq!(svc.state(), Status::Resolved);
}

#[test]
fn live_shutdown_without_case() {
    let queue = EventQueue::new();
    let runtime = Runtime::new(&queue).with_tick_period(Duration::from_millis(5));
    let (mut svc, mut sink) = service(EmergencyConfig::default());
    let mut out = MockOutputs::new();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            queue.submit_motion_sample(MotionSample::accel(0, 0.0, 0.0, 1.0));
            std::thread::sleep(std::time::Duration::from_millis(30));
            queue.request_shutdown();
        });
        runtime.run_blocking(&mut svc, &mut out, &mut sink);
    });

    assert_eq!(svc.state(), Status::Idle);
    assert_eq!(svc.events_handled(), 1);
    assert!(out.alerts.is_empty());
}
