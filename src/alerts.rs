//! Alert coordinator: maps orchestrator transitions to alert intents.
//!
//! Stateless apart from configuration.  The coordinator only *plans*; the
//! application service hands each [`AlertIntent`] to the `AlertPort`
//! independently, so a failure on one channel never blocks the others.
//!
//! | Transition        | Voice | Haptic | Local notification        | Contact push |
//! |-------------------|-------|--------|---------------------------|--------------|
//! | case opened       | yes*  | yes*   | `EMERGENCY_RESPONSE` + 2  | see below    |
//! | escalated         | yes*  | -      | "services notified"       | -            |
//!
//! `*` gated by [`AlertPreferences`](crate::config::AlertPreferences).
//!
//! Contact push goes to primary contacts.  Without a primary contact it is
//! sent to every contact only when the case severity is `High` or above.

use heapless::Vec as HVec;
use log::debug;
use serde::Serialize;

use crate::config::{EmergencyConfig, EmergencyContact};
use crate::model::{CaseId, EmergencyCase, Severity};

/// Haptic pattern played when a case opens: three pulses, offsets in ms.
pub const HAPTIC_PULSES_MS: [u32; 3] = [0, 500, 1_000];

/// Notification category carrying the two response actions.
pub const NOTIFICATION_CATEGORY: &str = "EMERGENCY_RESPONSE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertChannel {
    Voice,
    Haptic,
    LocalNotification,
    ContactPush,
}

/// Action button attached to the emergency notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub id: &'static str,
    pub title: &'static str,
}

impl NotificationAction {
    pub const CALL_911: Self = Self {
        id: "CALL_911",
        title: "Call 911",
    };
    pub const DISMISS: Self = Self {
        id: "DISMISS",
        title: "I'm OK",
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertPayload {
    Speech {
        text: String,
        language: String,
        rate: f32,
    },
    Haptic {
        pulses_ms: HVec<u32, 4>,
    },
    LocalNotification {
        title: String,
        body: String,
        category: &'static str,
        actions: HVec<NotificationAction, 2>,
    },
    ContactPush {
        recipients: Vec<EmergencyContact>,
        title: String,
        body: String,
        severity: Severity,
    },
}

/// One fire-and-forget alert request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertIntent {
    pub case_id: CaseId,
    pub channel: AlertChannel,
    pub payload: AlertPayload,
}

/// Intents produced for one transition.  At most one per channel.
pub type AlertPlan = HVec<AlertIntent, 4>;

pub struct AlertCoordinator {
    config: EmergencyConfig,
}

impl AlertCoordinator {
    pub fn new(config: &EmergencyConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn reconfigure(&mut self, config: &EmergencyConfig) {
        self.config = config.clone();
    }

    /// Alerts for a freshly opened case.
    pub fn plan_opened(&self, case: &EmergencyCase) -> AlertPlan {
        let mut plan = AlertPlan::new();
        let prefs = &self.config.preferences;

        if prefs.enable_voice_alerts {
            let text = format!(
                "Emergency detected. I will call {} in {} seconds unless you cancel.",
                self.config.emergency_number, self.config.countdown_secs
            );
            push(&mut plan, self.speech(case.id, text));
        }

        if prefs.enable_haptic_feedback {
            let mut pulses_ms = HVec::new();
            for offset in HAPTIC_PULSES_MS {
                let _ = pulses_ms.push(offset);
            }
            push(
                &mut plan,
                AlertIntent {
                    case_id: case.id,
                    channel: AlertChannel::Haptic,
                    payload: AlertPayload::Haptic { pulses_ms },
                },
            );
        }

        let mut actions = HVec::new();
        let _ = actions.push(NotificationAction::CALL_911);
        let _ = actions.push(NotificationAction::DISMISS);
        push(
            &mut plan,
            AlertIntent {
                case_id: case.id,
                channel: AlertChannel::LocalNotification,
                payload: AlertPayload::LocalNotification {
                    title: "Emergency Detected".into(),
                    body: format!(
                        "Lifeline detected: {}. Tap to respond.",
                        case.description
                    ),
                    category: NOTIFICATION_CATEGORY,
                    actions,
                },
            },
        );

        let recipients = self.push_recipients(case.severity);
        if recipients.is_empty() {
            debug!("{}: no contact push (severity {})", case.id, case.severity);
        } else {
            push(
                &mut plan,
                AlertIntent {
                    case_id: case.id,
                    channel: AlertChannel::ContactPush,
                    payload: AlertPayload::ContactPush {
                        recipients,
                        title: "Emergency Alert".into(),
                        body: format!("Emergency: {} ({} severity)", case.kind, case.severity),
                        severity: case.severity,
                    },
                },
            );
        }

        plan
    }

    /// Alerts for a case handed to the call gate.
    pub fn plan_escalated(&self, case: &EmergencyCase) -> AlertPlan {
        let mut plan = AlertPlan::new();

        if self.config.preferences.enable_voice_alerts {
            let text = format!("Calling {} now.", self.config.emergency_number);
            push(&mut plan, self.speech(case.id, text));
        }

        push(
            &mut plan,
            AlertIntent {
                case_id: case.id,
                channel: AlertChannel::LocalNotification,
                payload: AlertPayload::LocalNotification {
                    title: "Emergency Detected".into(),
                    body: format!(
                        "Lifeline detected: {}. Emergency services have been notified.",
                        case.kind
                    ),
                    category: NOTIFICATION_CATEGORY,
                    actions: HVec::new(),
                },
            },
        );

        plan
    }

    fn speech(&self, case_id: CaseId, text: String) -> AlertIntent {
        let prefs = &self.config.preferences;
        AlertIntent {
            case_id,
            channel: AlertChannel::Voice,
            payload: AlertPayload::Speech {
                text,
                language: prefs.speech_language.clone(),
                rate: prefs.speech_rate,
            },
        }
    }

    fn push_recipients(&self, severity: Severity) -> Vec<EmergencyContact> {
        let contacts = &self.config.contacts;
        if self.config.has_primary_contact() {
            contacts.iter().filter(|c| c.is_primary).cloned().collect()
        } else if severity >= Severity::High {
            contacts.clone()
        } else {
            Vec::new()
        }
    }
}

fn push(plan: &mut AlertPlan, intent: AlertIntent) {
    if plan.push(intent).is_err() {
        debug!("alert plan full");
    }
}
