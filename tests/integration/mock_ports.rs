//! Mock port adapters for integration tests.
//!
//! Records every intent and event so tests can assert on the full output
//! history without a speaker, a notification centre or a phone.

use std::time::Instant;

use lifeline::alerts::{AlertChannel, AlertIntent};
use lifeline::app::events::AppEvent;
use lifeline::app::ports::{AlertPort, DialerPort, EventSink};
use lifeline::call_gate::CallIntent;
use lifeline::error::DeliveryError;
use lifeline::events::EventQueue;
use lifeline::fsm::Status;

// ── MockOutputs ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockOutputs<'q> {
    pub alerts: Vec<AlertIntent>,
    pub calls: Vec<CallIntent>,
    /// Channels whose delivery fails.
    pub failing: Vec<AlertChannel>,
    pub dialer_fails: bool,
    /// When set, every dial immediately reports the call ended and asks the
    /// runtime to stop.
    pub hang_up_via: Option<&'q EventQueue>,
    /// Wall-clock time of the most recent dial.
    pub dialed_at: Option<Instant>,
}

#[allow(dead_code)]
impl<'q> MockOutputs<'q> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hanging_up_via(queue: &'q EventQueue) -> Self {
        Self {
            hang_up_via: Some(queue),
            ..Self::default()
        }
    }

    pub fn channels(&self) -> Vec<AlertChannel> {
        self.alerts.iter().map(|a| a.channel).collect()
    }
}

impl AlertPort for MockOutputs<'_> {
    fn deliver(&mut self, intent: &AlertIntent) -> Result<(), DeliveryError> {
        self.alerts.push(intent.clone());
        if self.failing.contains(&intent.channel) {
            Err(DeliveryError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl DialerPort for MockOutputs<'_> {
    fn dial(&mut self, intent: &CallIntent) -> Result<(), DeliveryError> {
        self.calls.push(intent.clone());
        self.dialed_at = Some(Instant::now());
        if self.dialer_fails {
            return Err(DeliveryError::PermissionDenied);
        }
        if let Some(queue) = self.hang_up_via {
            queue.submit_call_ended(intent.case_id);
            queue.request_shutdown();
        }
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Settled state changes, in order.
    pub fn transitions(&self) -> Vec<(Status, Status)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn calls(&self) -> Vec<&CallIntent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Call { intent } => Some(intent),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
