//! Field-level record cleaning
//!
//! The transformer applies the outcome policy to every configured URL
//! field of one record, mutating it in place. Scalar fields are kept,
//! rewritten, or deleted as a whole; array fields are filtered element by
//! element with their order preserved, and dropped entirely when nothing
//! survives.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::checker::{CheckOutcome, CheckUrls};
use crate::classify::is_valid_url;
use crate::stats::{CheckKind, Statistics};

/// One parsed JSON Lines record. Field order is preserved end to end via
/// serde_json's `preserve_order` feature.
pub type Record = Map<String, Value>;

/// Shared, read-only context for transforming records.
pub struct TransformContext {
    pub fields: Vec<String>,
    pub follow_redirects: bool,
    pub delete_timeouts: bool,
    pub checker: Arc<dyn CheckUrls>,
    pub stats: Arc<Statistics>,
}

/// Per-record events surfaced to the worker for reporting. Events never
/// influence how later records are processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEvent {
    /// A URL was deleted (invalid syntax or confirmed absent)
    Removed(String),
    /// A URL was rewritten to its redirect target
    Redirect { source: String, target: String },
    /// A URL timed out or failed at the connection level
    Timeout(String),
}

/// What the policy decided for a single URL value.
enum Disposition {
    Keep,
    Replace(String),
    Delete,
}

/// Clean all configured URL fields of `record` in place, returning the
/// events produced along the way.
pub async fn transform(record: &mut Record, cx: &TransformContext) -> Vec<RecordEvent> {
    let mut events = Vec::new();

    for field in &cx.fields {
        let Some(value) = record.get(field) else {
            continue;
        };

        match value.clone() {
            Value::String(url) => match apply_policy(field, &url, cx, &mut events).await {
                Disposition::Keep => {}
                Disposition::Replace(target) => {
                    record.insert(field.clone(), Value::String(target));
                }
                Disposition::Delete => {
                    record.remove(field);
                }
            },
            Value::Array(items) => {
                let mut kept = Vec::with_capacity(items.len());
                for item in items {
                    let Value::String(url) = item else {
                        // Non-string entries cannot be URLs
                        cx.stats.record(field, CheckKind::Removed);
                        continue;
                    };
                    match apply_policy(field, &url, cx, &mut events).await {
                        Disposition::Keep => kept.push(Value::String(url)),
                        Disposition::Replace(target) => kept.push(Value::String(target)),
                        Disposition::Delete => {}
                    }
                }
                if kept.is_empty() {
                    record.remove(field);
                } else {
                    record.insert(field.clone(), Value::Array(kept));
                }
            }
            _ => {
                // A number, bool, object or null in a URL field is as
                // unusable as a malformed string
                cx.stats.record(field, CheckKind::Removed);
                record.remove(field);
            }
        }
    }

    events
}

async fn apply_policy(
    field: &str,
    url: &str,
    cx: &TransformContext,
    events: &mut Vec<RecordEvent>,
) -> Disposition {
    if !is_valid_url(url) {
        cx.stats.record(field, CheckKind::Removed);
        events.push(RecordEvent::Removed(url.to_string()));
        return Disposition::Delete;
    }

    match cx.checker.check(url).await {
        CheckOutcome::Valid => {
            cx.stats.record(field, CheckKind::Valid);
            Disposition::Keep
        }
        CheckOutcome::Redirected(target) => {
            cx.stats.record(field, CheckKind::Redirected);
            if cx.follow_redirects && target != url {
                events.push(RecordEvent::Redirect {
                    source: url.to_string(),
                    target: target.clone(),
                });
                Disposition::Replace(target)
            } else {
                Disposition::Keep
            }
        }
        CheckOutcome::NotFound | CheckOutcome::InvalidSyntax => {
            cx.stats.record(field, CheckKind::Removed);
            events.push(RecordEvent::Removed(url.to_string()));
            Disposition::Delete
        }
        CheckOutcome::TimedOut | CheckOutcome::NetworkError => {
            cx.stats.record(field, CheckKind::TimedOut);
            events.push(RecordEvent::Timeout(url.to_string()));
            if cx.delete_timeouts {
                Disposition::Delete
            } else {
                Disposition::Keep
            }
        }
    }
}
