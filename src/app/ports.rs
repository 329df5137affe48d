//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ EmergencyService (domain)
//! ```
//!
//! Driven adapters (speech, haptics, notifications, push, dialer, UI) implement
//! these traits.  The [`EmergencyService`](super::service::EmergencyService)
//! consumes them via generics, so the domain core never performs I/O itself.
//!
//! Delivery is fire-and-forget from the core's point of view: a port returns
//! a [`DeliveryError`] and the core reports it, nothing more.  Retries belong
//! to the adapter.

use crate::alerts::AlertIntent;
use crate::call_gate::CallIntent;
use crate::error::DeliveryError;

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Alert port (domain → speech / haptics / notifications / push)
// ───────────────────────────────────────────────────────────────

pub trait AlertPort {
    /// Hand one intent to the alerting collaborator.  Must not block.
    fn deliver(&mut self, intent: &AlertIntent) -> Result<(), DeliveryError>;
}

// ───────────────────────────────────────────────────────────────
// Dialer port (domain → phone)
// ───────────────────────────────────────────────────────────────

pub trait DialerPort {
    /// Start the call.  Completion is reported back later as a
    /// call-ended event, not through this return value.
    fn dial(&mut self, intent: &CallIntent) -> Result<(), DeliveryError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → UI / logging / history)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
