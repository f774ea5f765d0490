//! LINE Messaging API module.
//!
//! This module provides:
//! - Wire types for inbound webhooks and outbound pushes
//! - An async client for the push endpoint
//!
//! ## Flow
//!
//! ```text
//! LINE → POST /webhook → WebhookPayload → dispatch → LineClient::push_text → LINE
//! ```

pub mod client;
pub mod types;

pub use client::{LineClient, Messenger, PushError};
pub use types::{
    Event, EventKind, Message, MessageKind, PayloadError, PushRequest, Source, SourceKind,
    WebhookPayload,
};
