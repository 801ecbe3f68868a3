//! Item identity for cross-view bookkeeping.
//!
//! Selection, hover, and copy feedback all need to say "this item" in a way
//! that survives views rebuilding their own copies of the page data. An
//! [`ItemKey`] is derived from the item itself, in priority order:
//!
//! 1. the explicit `id`, when present and non-blank;
//! 2. the bounding-box coordinates joined with `,`;
//! 3. the item's position in its page (`fallback_index`).
//!
//! Two id-less items with identical boxes get the same key and are treated
//! as one logical item. Keys are for UI bookkeeping only and are never
//! persisted.

use serde::Serialize;
use std::fmt;

use crate::models::ContentItem;

/// Delimiter between bounding-box coordinates in a [`ItemKey::Bbox`] key.
pub const BBOX_DELIMITER: &str = ",";

/// Derived identity of a content item.
///
/// The variant records which rule produced the key, so an id `"5"` never
/// equals a position `5`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "source", content = "key", rename_all = "snake_case")]
pub enum ItemKey {
    Id(String),
    Bbox(String),
    Index(usize),
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.write_str(id),
            Self::Bbox(joined) => f.write_str(joined),
            Self::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Derive the identity of `item`, using `fallback_index` when it has
/// neither an id nor any bounding-box coordinates.
pub fn resolve_identity(item: &ContentItem, fallback_index: usize) -> ItemKey {
    if let Some(id) = item.id.as_ref().filter(|id| !id.is_blank()) {
        return ItemKey::Id(id.to_string());
    }
    match item.bbox.as_deref() {
        Some(coords) if !coords.is_empty() => ItemKey::Bbox(join_coords(coords)),
        _ => ItemKey::Index(fallback_index),
    }
}

fn join_coords(coords: &[f64]) -> String {
    coords
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(BBOX_DELIMITER)
}
