//! Wire types for the LINE Messaging API.
//!
//! This module defines:
//! - Inbound webhook payloads (`WebhookPayload`, `Event`)
//! - Outbound push message requests (`PushRequest`)
//!
//! Inbound types are lenient: unknown tags decode to `Other` and missing
//! optional fields decode to `None`, so a new event kind never fails a batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

// =============================================================================
// Inbound Webhook Types
// =============================================================================

/// Errors for a payload whose overall shape is unusable.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("webhook body is not a JSON object")]
    NotAnObject,

    #[error("webhook `events` field is not an array")]
    EventsNotArray,
}

/// A decoded webhook request body.
#[derive(Debug, Clone, Default)]
pub struct WebhookPayload {
    /// Bot user id the webhook was sent to
    pub destination: Option<String>,
    /// Events in delivery order
    pub events: Vec<Event>,
    /// Entries of `events` that did not decode as an `Event`
    pub skipped: usize,
}

impl WebhookPayload {
    /// Decode a payload from an already parsed JSON document.
    ///
    /// A missing or `null` `events` field yields an empty batch. Individual
    /// entries that do not decode are counted in `skipped` and dropped.
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        let Value::Object(mut object) = value else {
            return Err(PayloadError::NotAnObject);
        };

        let destination = match object.remove("destination") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };

        let raw_events = match object.remove("events") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(PayloadError::EventsNotArray),
        };

        let mut events = Vec::with_capacity(raw_events.len());
        let mut skipped = 0;

        for (index, raw) in raw_events.into_iter().enumerate() {
            match serde_json::from_value::<Event>(raw) {
                Ok(event) => events.push(event),
                Err(e) => {
                    debug!(index = index, error = %e, "webhook_event_undecodable");
                    skipped += 1;
                }
            }
        }

        Ok(Self {
            destination,
            events,
            skipped,
        })
    }
}

/// A single webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub message: Option<Message>,
}

impl Event {
    /// User id of the sender, if the platform disclosed one.
    pub fn sender_user_id(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.user_id.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Message,
    #[serde(other)]
    Other,
}

/// Where an event originated.
#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
    #[serde(default, rename = "groupId")]
    pub group_id: Option<String>,
    #[serde(default, rename = "roomId")]
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    User,
    Group,
    Room,
    #[serde(other)]
    Other,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::User => "user",
            SourceKind::Group => "group",
            SourceKind::Room => "room",
            SourceKind::Other => "other",
        }
    }
}

/// Message content attached to a `message` event.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    #[serde(other)]
    Other,
}

// =============================================================================
// Outbound Push Types
// =============================================================================

/// Body of `POST /v2/bot/message/push`.
#[derive(Debug, Clone, Serialize)]
pub struct PushRequest<'a> {
    pub to: &'a str,
    pub messages: Vec<OutboundMessage<'a>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage<'a> {
    Text { text: &'a str },
}

impl<'a> PushRequest<'a> {
    /// A push containing a single text message.
    pub fn text(to: &'a str, text: &'a str) -> Self {
        Self {
            to,
            messages: vec![OutboundMessage::Text { text }],
        }
    }
}
