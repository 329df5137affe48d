//! Lifeline emergency detection core.
//!
//! Turns motion samples, vitals snapshots and user input into at most one
//! open emergency case, runs the cancel countdown, and emits alert and
//! call intents for external collaborators to deliver.
//!
//! ```text
//!  producers ──▶ EventQueue ──▶ EmergencyService ──▶ AlertPort / DialerPort
//!                    ▲              (FSM owner)     ──▶ EventSink
//!                    └── Runtime ticker (1 s)
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod alerts;
pub mod app;
pub mod call_gate;
pub mod config;
pub mod countdown;
pub mod detect;
pub mod error;
pub mod events;
pub mod fsm;
pub mod model;
pub mod runtime;

pub use app::commands::UserAction;
pub use app::service::EmergencyService;
pub use config::EmergencyConfig;
pub use error::{Error, Result};
pub use events::{Event, EventQueue};
pub use fsm::Status;
