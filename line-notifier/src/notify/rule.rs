//! The progress-trigger notification rule.

use crate::line::{Event, EventKind, MessageKind};
use crate::Config;

/// Text pushed when `FORM_URL` is not configured.
pub const FORM_URL_PLACEHOLDER: &str = "(FORM_URL が未設定です)";

/// Build the message sent to the authorized user.
pub fn format_notification(form_url: Option<&str>) -> String {
    let url = form_url.unwrap_or(FORM_URL_PLACEHOLDER);
    format!("📌進捗トリガー検知！\nフォームはこちら👇\n{}", url)
}

/// A push the rule decided to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Recipient user id. Always the sender, never a group or room.
    pub to: String,
    pub text: String,
}

/// Why an event did not produce a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    NotMessage,
    NotText,
    NoTrigger,
    Unauthorized,
}

/// Single-user trigger rule.
#[derive(Debug, Clone)]
pub struct NotificationRule {
    pub trigger_phrase: String,
    pub trigger_user_id: Option<String>,
    pub form_url: Option<String>,
}

impl NotificationRule {
    pub fn from_config(config: &Config) -> Self {
        Self {
            trigger_phrase: config.trigger_phrase.clone(),
            trigger_user_id: config.trigger_user_id.clone(),
            form_url: config.form_url.clone(),
        }
    }

    /// Whether `user_id` is the configured authorized sender.
    ///
    /// Always false when no trigger user is configured.
    pub fn is_authorized(&self, user_id: Option<&str>) -> bool {
        match (self.trigger_user_id.as_deref(), user_id) {
            (Some(expected), Some(actual)) => expected == actual,
            _ => false,
        }
    }

    /// Decide what to do with one event.
    pub fn evaluate(&self, event: &Event) -> Result<Notification, Skip> {
        if event.kind != EventKind::Message {
            return Err(Skip::NotMessage);
        }

        let message = match &event.message {
            Some(m) if m.kind == MessageKind::Text => m,
            _ => return Err(Skip::NotText),
        };

        let text = message.text.as_deref().unwrap_or("");
        let trigger = text.contains(self.trigger_phrase.as_str());

        if !trigger {
            return Err(Skip::NoTrigger);
        }

        let sender = event.sender_user_id();
        let Some(to) = sender.filter(|_| self.is_authorized(sender)) else {
            return Err(Skip::Unauthorized);
        };

        Ok(Notification {
            to: to.to_string(),
            text: format_notification(self.form_url.as_deref()),
        })
    }
}
