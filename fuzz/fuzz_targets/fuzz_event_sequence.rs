//! Fuzz target: `EmergencyService::handle` over arbitrary event sequences
//!
//! Each input byte selects one event.  The service must never panic, never
//! hold a case while idle, and never dial twice for one case.
//!
//! cargo fuzz run fuzz_event_sequence

#![no_main]

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;
use lifeline::alerts::AlertIntent;
use lifeline::app::events::AppEvent;
use lifeline::app::ports::{AlertPort, DialerPort, EventSink};
use lifeline::app::service::EmergencyService;
use lifeline::call_gate::CallIntent;
use lifeline::config::EmergencyConfig;
use lifeline::error::DeliveryError;
use lifeline::model::{CandidateKind, CaseId, MotionSample, VitalsSnapshot};
use lifeline::{Event, Status, UserAction};

struct Ports {
    dialed: HashSet<CaseId>,
    byte: u8,
}

impl AlertPort for Ports {
    fn deliver(&mut self, _intent: &AlertIntent) -> Result<(), DeliveryError> {
        // Fail roughly a quarter of deliveries.
        if self.byte & 0b11 == 0 {
            Err(DeliveryError::Io)
        } else {
            Ok(())
        }
    }
}

impl DialerPort for Ports {
    fn dial(&mut self, intent: &CallIntent) -> Result<(), DeliveryError> {
        assert!(self.dialed.insert(intent.case_id), "dialed twice");
        Ok(())
    }
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fn decode(byte: u8, t: u64) -> Event {
    let id = CaseId(u32::from(byte >> 5));
    match byte & 0x0f {
        0 => Event::Motion(MotionSample::accel(t, 0.0, 0.0, 2.8)),
        1 => Event::Motion(MotionSample::accel(t, 0.0, 0.0, 3.6)),
        2 => Event::Motion(MotionSample::accel(t, f64::NAN, 0.0, 0.0)),
        3 => Event::Vitals(VitalsSnapshot {
            spo2: Some(f64::from(byte)),
            ..Default::default()
        }),
        4 => Event::ManualTrigger {
            kind: CandidateKind::ManualSos,
            severity: None,
            at_ms: t,
        },
        5 => Event::User { action: UserAction::Dismiss },
        6 => Event::User { action: UserAction::Confirm },
        7 => Event::User { action: UserAction::GetHelp },
        8 => Event::User { action: UserAction::Clear },
        9 => Event::CallEnded { case_id: id },
        _ => Event::CountdownTick { case_id: id },
    }
}

fuzz_target!(|data: &[u8]| {
    let mut config = EmergencyConfig::default();
    config.countdown_secs = 2;
    let mut svc = EmergencyService::new(config);
    let mut ports = Ports {
        dialed: HashSet::new(),
        byte: 0,
    };
    let mut sink = NullSink;
    svc.start(&mut sink);

    for (i, &byte) in data.iter().enumerate() {
        ports.byte = byte;
        svc.handle(decode(byte, i as u64 * 700), &mut ports, &mut sink);

        match svc.current_case() {
            None => assert_eq!(svc.state(), Status::Idle),
            Some(case) => assert_eq!(case.status, svc.state()),
        }
    }
});
