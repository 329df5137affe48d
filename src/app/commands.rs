//! Inbound user commands.
//!
//! These are the responses a user can give to an open case, whether from
//! the countdown screen, a notification action button or a voice prompt.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    /// "I'm OK": cancel the countdown, report a false alarm.
    Dismiss,
    /// "Call 911": skip the rest of the countdown and escalate now.
    Confirm,
    /// Downgrade to first-aid guidance; no call is placed.
    GetHelp,
    /// Acknowledge a resolved case and drop its record.
    Clear,
}

impl UserAction {
    /// Map a notification action identifier to the action it stands for.
    pub fn from_notification_action(id: &str) -> Option<Self> {
        match id {
            "CALL_911" => Some(Self::Confirm),
            "DISMISS" => Some(Self::Dismiss),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::NotificationAction;

    #[test]
    fn notification_actions_map() {
        assert_eq!(
            UserAction::from_notification_action(NotificationAction::CALL_911.id),
            Some(UserAction::Confirm)
        );
        assert_eq!(
            UserAction::from_notification_action(NotificationAction::DISMISS.id),
            Some(UserAction::Dismiss)
        );
        assert_eq!(UserAction::from_notification_action("SNOOZE"), None);
    }
}
