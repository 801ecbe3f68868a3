//! Structural tree view: the active page's items as collapsible JSON.
//!
//! Expand and hide toggles are keyed by item position and only make sense
//! for one page, so [`TreeViewState::sync_page`] drops them whenever the
//! active page changes.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geometry::BoundingBox;
use crate::identity::{resolve_identity, ItemKey};
use crate::models::Page;
use crate::selection::{Selection, SelectionCoordinator};
use crate::views::copy::CopyFeedback;

const SELECTED_TEXT_PREVIEW: usize = 100;

#[derive(Debug, Clone, Default)]
pub struct TreeViewState {
    page_index: Option<usize>,
    expanded: BTreeSet<usize>,
    hidden: BTreeSet<usize>,
}

impl TreeViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the toggles if `page_index` differs from the last page seen.
    pub fn sync_page(&mut self, page_index: usize) {
        if self.page_index != Some(page_index) {
            self.expanded.clear();
            self.hidden.clear();
            self.page_index = Some(page_index);
        }
    }

    pub fn toggle_expanded(&mut self, index: usize) {
        if !self.expanded.remove(&index) {
            self.expanded.insert(index);
        }
    }

    pub fn toggle_hidden(&mut self, index: usize) {
        if !self.hidden.remove(&index) {
            self.hidden.insert(index);
        }
    }

    pub fn expand_all(&mut self, item_count: usize) {
        self.expanded = (0..item_count).collect();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    pub fn show_all(&mut self) {
        self.hidden.clear();
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.contains(&index)
    }

    pub fn is_hidden(&self, index: usize) -> bool {
        self.hidden.contains(&index)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeRow {
    pub index: usize,
    pub key: ItemKey,
    /// `"Item <n> (<type>)"`, or `"// Item <n> hidden"` for hidden rows.
    pub label: String,
    pub hidden: bool,
    pub expanded: bool,
    pub selected: bool,
    pub copied: bool,
    /// Pretty JSON of the item, present only when expanded and visible.
    pub json: Option<String>,
}

/// Build the rows for `page`.
pub fn tree_rows(
    state: &TreeViewState,
    page: &Page,
    page_index: usize,
    selection: &SelectionCoordinator,
    feedback: &CopyFeedback,
    now: DateTime<Utc>,
) -> Vec<TreeRow> {
    page.items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let key = resolve_identity(item, index);
            let hidden = state.is_hidden(index);
            let expanded = state.is_expanded(index);
            let label = if hidden {
                format!("// Item {} hidden", index + 1)
            } else {
                format!("Item {} ({})", index + 1, item.kind_label("unknown"))
            };
            let json = (expanded && !hidden)
                .then(|| serde_json::to_string_pretty(item).ok())
                .flatten();
            TreeRow {
                index,
                copied: feedback.is_copied(&key, now),
                key,
                label,
                hidden,
                expanded,
                selected: selection.is_selected(item, index, page_index),
                json,
            }
        })
        .collect()
}

/// Summary of the selected item shown under the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedInfo {
    pub kind: String,
    /// First 100 characters of the text, if any.
    pub text_preview: Option<String>,
    pub bbox: Option<BoundingBox>,
}

pub fn selected_info(selection: &Selection) -> SelectedInfo {
    let item = &selection.item;
    SelectedInfo {
        kind: item.kind_label("unknown").to_string(),
        text_preview: item
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| t.chars().take(SELECTED_TEXT_PREVIEW).collect()),
        bbox: item.bounding_box(),
    }
}
