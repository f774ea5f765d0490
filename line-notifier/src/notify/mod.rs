//! Event dispatch for verified webhook batches.
//!
//! ## Processing Flow
//!
//! ```text
//! [Event] → NotificationRule::evaluate() → Messenger::push_text()
//! ```
//!
//! Events are handled in order and pushes are awaited one at a time. A failed
//! push is logged and counted; it never stops the rest of the batch.

pub mod rule;

use tracing::{debug, error, info};

use crate::line::{Event, Messenger};

pub use rule::{format_notification, Notification, NotificationRule, Skip, FORM_URL_PLACEHOLDER};

/// Outcome counts for one dispatched batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub events: usize,
    pub matched: usize,
    pub pushed: usize,
    pub failed: usize,
}

/// Apply the notification rule to every event in the batch.
///
/// A failed push does not abort the batch: it is logged, counted in
/// `failed`, and the remaining events are still evaluated. Callers answer
/// 200 regardless of `failed`.
pub async fn dispatch<M: Messenger>(
    events: &[Event],
    rule: &NotificationRule,
    messenger: &M,
) -> DispatchSummary {
    let mut summary = DispatchSummary {
        events: events.len(),
        ..Default::default()
    };

    for (index, event) in events.iter().enumerate() {
        if let Some(source) = &event.source {
            if let Some(user_id) = &source.user_id {
                info!(
                    sender_user_id = %user_id,
                    source_type = source.kind.as_str(),
                    group_id = ?source.group_id,
                    room_id = ?source.room_id,
                    "webhook_event_sender"
                );
            }
        }

        let notification = match rule.evaluate(event) {
            Ok(n) => n,
            Err(reason) => {
                debug!(index = index, reason = ?reason, "webhook_event_skipped");
                continue;
            }
        };

        summary.matched += 1;

        match messenger.push_text(&notification.to, &notification.text).await {
            Ok(()) => {
                summary.pushed += 1;
                info!(to = %notification.to, "form_url_pushed");
            }
            Err(e) => {
                summary.failed += 1;
                error!(to = %notification.to, error = %e, "form_url_push_failed");
            }
        }
    }

    info!(
        events = summary.events,
        matched = summary.matched,
        pushed = summary.pushed,
        failed = summary.failed,
        "webhook_dispatch_complete"
    );

    summary
}
