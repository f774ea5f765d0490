//! LINE Notifier - progress-trigger webhook receiver.
//!
//! Receives LINE Messaging API webhooks, verifies their signature, and pushes
//! a form link to the configured user when they send the trigger phrase.
//!
//! ## Architecture
//!
//! ```text
//! LINE → POST /webhook → verify signature → dispatch events → push message → LINE
//! ```

pub mod config;
pub mod line;
pub mod notify;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use line::{Event, LineClient, Messenger, PushError, WebhookPayload};
pub use notify::{dispatch, DispatchSummary, NotificationRule};
pub use web::{router, AppState};
