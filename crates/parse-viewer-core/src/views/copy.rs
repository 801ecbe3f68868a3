//! Copy-to-clipboard text and the transient "copied" marker.

use chrono::{DateTime, Duration, Utc};

use crate::identity::ItemKey;
use crate::models::ContentItem;

/// Default time an item stays marked as copied.
pub const DEFAULT_FEEDBACK_MS: u64 = 2000;

/// Text placed on the clipboard for `item`: its text, else its content,
/// else the item as pretty-printed JSON.
pub fn copy_text(item: &ContentItem) -> String {
    match item.text_or_content() {
        Some(text) => text.to_string(),
        None => serde_json::to_string_pretty(item).unwrap_or_default(),
    }
}

/// Remembers the last copied item for a short window.
#[derive(Debug, Clone)]
pub struct CopyFeedback {
    window: Duration,
    copied: Option<(ItemKey, DateTime<Utc>)>,
}

impl Default for CopyFeedback {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDBACK_MS)
    }
}

impl CopyFeedback {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window: Duration::milliseconds(i64::try_from(window_ms).unwrap_or(i64::MAX)),
            copied: None,
        }
    }

    /// Mark `key` as copied at `now`, replacing any earlier mark.
    pub fn mark(&mut self, key: ItemKey, now: DateTime<Utc>) {
        self.copied = Some((key, now));
    }

    /// The key still inside its feedback window at `now`.
    pub fn active(&self, now: DateTime<Utc>) -> Option<&ItemKey> {
        match &self.copied {
            Some((key, at)) if now - *at < self.window => Some(key),
            _ => None,
        }
    }

    pub fn is_copied(&self, key: &ItemKey, now: DateTime<Utc>) -> bool {
        self.active(now) == Some(key)
    }

    pub fn clear(&mut self) {
        self.copied = None;
    }
}
