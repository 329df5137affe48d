//! Single ordered event queue feeding the orchestrator.
//!
//! Events are produced by:
//! - Sensor callbacks (motion samples, vitals snapshots)
//! - The UI (manual SOS, dismiss / confirm / get help / clear)
//! - The dialer (call ended)
//! - The 1 s countdown ticker
//!
//! and consumed by exactly one processing context, which applies them to
//! the state machine in arrival order.  Producers never touch the case.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌────────────────────┐
//! │ Sensors     │────▶│              │     │                    │
//! │ UI          │────▶│  EventQueue  │────▶│  EmergencyService  │
//! │ Dialer      │────▶│  (bounded)   │     │  (single writer)   │
//! │ Ticker      │────▶│              │     │                    │
//! └─────────────┘     └──────────────┘     └────────────────────┘
//! ```
//!
//! Every `submit_*` call is a non-blocking `try_send`.  When the queue is
//! full the new event is dropped, counted, and the call returns `false`.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::app::commands::UserAction;
use crate::model::{CandidateKind, CaseId, Millis, MotionSample, Severity, VitalsSnapshot};

/// Maximum number of pending events.
pub const EVENT_QUEUE_DEPTH: usize = 64;

/// Everything the orchestrator reacts to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    // ── Sensor data ───────────────────────────────────────
    Motion(MotionSample),
    Vitals(VitalsSnapshot),

    // ── User input ────────────────────────────────────────
    /// Manual SOS (or a test trigger of another kind).
    ManualTrigger {
        kind: CandidateKind,
        #[serde(default)]
        severity: Option<Severity>,
        #[serde(default)]
        at_ms: Millis,
    },
    User { action: UserAction },

    // ── External collaborators ────────────────────────────
    CallEnded { case_id: CaseId },

    // ── Timing ────────────────────────────────────────────
    /// One elapsed countdown second for the case it was armed for.
    CountdownTick { case_id: CaseId },

    // ── Housekeeping ──────────────────────────────────────
    /// Stop the runtime's processing loop.
    Shutdown,
}

pub struct EventQueue {
    channel: Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH>,
    dropped: AtomicU32,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue without blocking.  Returns `false` if the queue is full
    /// (event dropped).
    pub fn push(&self, event: Event) -> bool {
        match self.channel.try_send(event) {
            Ok(()) => true,
            Err(embassy_sync::channel::TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("event queue full, dropping {:?}", event);
                false
            }
        }
    }

    /// Enqueue, waiting for space if the queue is full.  For producers that
    /// must not lose events, such as the countdown ticker.
    pub async fn send(&self, event: Event) {
        self.channel.send(event).await;
    }

    /// Next event in arrival order, or `None` if empty.
    pub fn pop(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    /// Wait for the next event.
    pub async fn receive(&self) -> Event {
        self.channel.receive().await
    }

    /// Drain all pending events into a callback, FIFO.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    /// Events rejected because the queue was full.
    pub fn dropped_count(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    // ── Producer API ──────────────────────────────────────

    pub fn submit_motion_sample(&self, sample: MotionSample) -> bool {
        self.push(Event::Motion(sample))
    }

    pub fn submit_vitals_snapshot(&self, snapshot: VitalsSnapshot) -> bool {
        self.push(Event::Vitals(snapshot))
    }

    /// `at_ms` is on the same clock as the sample timestamps.
    pub fn submit_manual_trigger(
        &self,
        kind: CandidateKind,
        severity: Option<Severity>,
        at_ms: Millis,
    ) -> bool {
        self.push(Event::ManualTrigger {
            kind,
            severity,
            at_ms,
        })
    }

    pub fn submit_user_action(&self, action: UserAction) -> bool {
        self.push(Event::User { action })
    }

    pub fn submit_call_ended(&self, case_id: CaseId) -> bool {
        self.push(Event::CallEnded { case_id })
    }

    pub fn request_shutdown(&self) -> bool {
        self.push(Event::Shutdown)
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
