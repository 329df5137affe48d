//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade.  A UI or history-store adapter would implement the
//! same trait.

use log::{info, warn};

use crate::alerts::AlertPayload;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { state } => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::CaseOpened { case } => {
                info!(
                    "CASE  | opened {} kind={} severity={} | {}",
                    case.id, case.kind, case.severity, case.description
                );
            }
            AppEvent::CountdownStarted { case_id, seconds } => {
                info!("COUNT | {} calling in {}s unless cancelled", case_id, seconds);
            }
            AppEvent::CountdownTick { case_id, remaining } => {
                info!("COUNT | {} {}s", case_id, remaining);
            }
            AppEvent::Escalated { case } => {
                warn!("ESCAL | {} escalated ({})", case.id, case.kind);
            }
            AppEvent::CaseResolved { case } => {
                info!("CASE  | {} resolved, call {:?}", case.id, case.call_state);
            }
            AppEvent::CaseClosed {
                case,
                final_status,
                reason,
            } => {
                info!(
                    "CASE  | closed {} final_status={:?} reason={:?}",
                    case.id, final_status, reason
                );
            }
            AppEvent::CandidateIgnored { kind, open_case } => {
                info!("CASE  | {} ignored, {} open", kind, open_case);
            }
            AppEvent::Alert { intent } => match &intent.payload {
                AlertPayload::Speech { text, .. } => {
                    info!("ALERT | {} voice \"{}\"", intent.case_id, text);
                }
                AlertPayload::Haptic { pulses_ms } => {
                    info!("ALERT | {} haptic {:?} ms", intent.case_id, pulses_ms.as_slice());
                }
                AlertPayload::LocalNotification { title, body, .. } => {
                    info!("ALERT | {} notify \"{}\": {}", intent.case_id, title, body);
                }
                AlertPayload::ContactPush { recipients, .. } => {
                    info!("ALERT | {} push to {} contact(s)", intent.case_id, recipients.len());
                }
            },
            AppEvent::Call { intent } => {
                warn!("CALL  | {} dialing {}", intent.case_id, intent.phone_number);
            }
            AppEvent::DeliveryFailed {
                case_id,
                target,
                error,
            } => {
                warn!("FAIL  | {} {:?}: {}", case_id, target, error);
            }
        }
    }
}
