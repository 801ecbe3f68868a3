//! Selection and hover shared by all views.
//!
//! Views never compare items by reference: each view may rebuild its own
//! copy of a page's items, so "is this the selected item?" is always
//! answered by comparing [`ItemKey`]s from the identity resolver.

use crate::identity::{resolve_identity, ItemKey};
use crate::models::ContentItem;

/// The single selected item.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub key: ItemKey,
    /// Index of the page the item was selected on.
    pub page_index: usize,
    /// Snapshot of the item, used by the selected-item info panel.
    pub item: ContentItem,
}

/// The item under the pointer. Transient and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverTarget {
    pub key: ItemKey,
    pub page_index: usize,
}

/// Holds the current selection and hover target.
#[derive(Debug, Clone, Default)]
pub struct SelectionCoordinator {
    selected: Option<Selection>,
    hovered: Option<HoverTarget>,
}

impl SelectionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `item`, replacing any previous selection.
    ///
    /// `index` is the item's position within its page, used as the identity
    /// fallback.
    pub fn select(&mut self, item: &ContentItem, index: usize, page_index: usize) -> &Selection {
        self.selected.insert(Selection {
            key: resolve_identity(item, index),
            page_index,
            item: item.clone(),
        })
    }

    /// Set or clear (`None`) the hover target.
    pub fn hover(&mut self, target: Option<(&ContentItem, usize)>, page_index: usize) {
        self.hovered = target.map(|(item, index)| HoverTarget {
            key: resolve_identity(item, index),
            page_index,
        });
    }

    /// Drop the selection. Hover is left alone; it follows the pointer.
    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn clear_hover(&mut self) {
        self.hovered = None;
    }

    pub fn selected(&self) -> Option<&Selection> {
        self.selected.as_ref()
    }

    pub fn hovered(&self) -> Option<&HoverTarget> {
        self.hovered.as_ref()
    }

    pub fn selected_key(&self) -> Option<&ItemKey> {
        self.selected.as_ref().map(|s| &s.key)
    }

    /// Whether `item` at `index` on `page_index` is the selected item.
    pub fn is_selected(&self, item: &ContentItem, index: usize, page_index: usize) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|s| s.page_index == page_index && s.key == resolve_identity(item, index))
    }

    /// Whether `item` at `index` on `page_index` is under the pointer.
    pub fn is_hovered(&self, item: &ContentItem, index: usize, page_index: usize) -> bool {
        self.hovered
            .as_ref()
            .is_some_and(|h| h.page_index == page_index && h.key == resolve_identity(item, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemId;

    fn item(coords: [f64; 4]) -> ContentItem {
        ContentItem {
            bbox: Some(coords.to_vec()),
            ..Default::default()
        }
    }

    #[test]
    fn test_select_replaces_previous() {
        let mut sel = SelectionCoordinator::new();
        let a = item([0.0, 0.0, 1.0, 1.0]);
        let b = item([2.0, 2.0, 3.0, 3.0]);
        sel.select(&a, 0, 0);
        sel.select(&b, 1, 0);
        assert!(!sel.is_selected(&a, 0, 0));
        assert!(sel.is_selected(&b, 1, 0));
    }

    #[test]
    fn test_reconstructed_item_matches_by_identity() {
        let mut sel = SelectionCoordinator::new();
        let original = ContentItem {
            id: Some(ItemId::Text("x".into())),
            text: Some("hello".into()),
            ..Default::default()
        };
        sel.select(&original, 3, 0);
        let rebuilt = original.clone();
        assert!(sel.is_selected(&rebuilt, 3, 0));
        assert!(!sel.is_selected(&rebuilt, 3, 1), "different page must not match");
    }

    #[test]
    fn test_hover_is_independent_of_selection() {
        let mut sel = SelectionCoordinator::new();
        let a = item([0.0, 0.0, 1.0, 1.0]);
        let b = item([2.0, 2.0, 3.0, 3.0]);
        sel.select(&a, 0, 0);
        sel.hover(Some((&b, 1)), 0);
        assert!(sel.is_hovered(&b, 1, 0));
        sel.clear();
        assert!(sel.selected().is_none());
        assert!(sel.is_hovered(&b, 1, 0));
        sel.hover(None, 0);
        assert!(sel.hovered().is_none());
    }
}
