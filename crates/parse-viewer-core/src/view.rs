//! Navigation state machine: pages plus the selection tied to them.
//!
//! A selection only means something on the page it was made on, so every
//! accepted navigation and every page replacement drops it. Keeping both
//! containers behind one owner makes that rule impossible to skip.

use crate::models::{ContentItem, Page};
use crate::pages::PageCollection;
use crate::selection::{Selection, SelectionCoordinator};

/// The page collection and selection coordinator of one viewer.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pages: PageCollection,
    selection: SelectionCoordinator,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &PageCollection {
        &self.pages
    }

    pub fn selection(&self) -> &SelectionCoordinator {
        &self.selection
    }

    /// Install the pages of a fresh upload: selection and hover are cleared
    /// and the first page becomes active.
    pub fn load_document(&mut self, pages: Vec<Page>) {
        self.selection.clear();
        self.selection.clear_hover();
        self.pages.replace_all(pages);
        self.pages.set_active_index(0);
    }

    /// Replace the page list, keeping the active page when still in range.
    pub fn replace_pages(&mut self, pages: Vec<Page>) {
        self.selection.clear();
        self.selection.clear_hover();
        self.pages.replace_all(pages);
    }

    /// Navigate to page `index`. Ignored when out of range; otherwise the
    /// selection is cleared.
    pub fn navigate(&mut self, index: usize) -> bool {
        if !self.pages.set_active_index(index) {
            return false;
        }
        self.selection.clear();
        self.selection.clear_hover();
        true
    }

    pub fn next_page(&mut self) -> bool {
        match self.pages.next_index() {
            Some(i) => self.navigate(i),
            None => false,
        }
    }

    pub fn previous_page(&mut self) -> bool {
        match self.pages.previous_index() {
            Some(i) => self.navigate(i),
            None => false,
        }
    }

    /// Select the item at `index` on the active page.
    pub fn select_index(&mut self, index: usize) -> Option<&Selection> {
        let page_index = self.pages.active_index();
        let item = self.pages.current_page()?.items.get(index)?;
        Some(self.selection.select(item, index, page_index))
    }

    /// Select `item` (possibly rebuilt by a view) found at `index` on the
    /// active page.
    pub fn select_item(&mut self, item: &ContentItem, index: usize) -> &Selection {
        let page_index = self.pages.active_index();
        self.selection.select(item, index, page_index)
    }

    /// Hover the item at `index` on the active page, or clear with `None`.
    pub fn hover_index(&mut self, index: Option<usize>) {
        let page_index = self.pages.active_index();
        let target = index.and_then(|i| {
            self.pages
                .current_page()
                .and_then(|p| p.items.get(i))
                .map(|item| (item, i))
        });
        self.selection.hover(target, page_index);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_items(n: u32, count: usize) -> Page {
        Page {
            page_number: n,
            items: (0..count)
                .map(|i| ContentItem {
                    bbox: Some(vec![i as f64, 0.0, i as f64 + 1.0, 1.0]),
                    ..Default::default()
                })
                .collect(),
            overlay_image_ref: format!("/o/{}.png", n),
            source_image_ref: None,
        }
    }

    #[test]
    fn test_navigation_clears_selection() {
        let mut view = ViewState::new();
        view.load_document(vec![page_with_items(1, 2), page_with_items(2, 2)]);
        assert!(view.select_index(1).is_some());
        assert!(view.navigate(1));
        assert!(view.selection().selected().is_none());
    }

    #[test]
    fn test_rejected_navigation_keeps_selection() {
        let mut view = ViewState::new();
        view.load_document(vec![page_with_items(1, 2)]);
        view.select_index(0);
        assert!(!view.navigate(5));
        assert!(view.selection().selected().is_some());
    }

    #[test]
    fn test_load_document_resets_to_first_page() {
        let mut view = ViewState::new();
        view.load_document(vec![page_with_items(1, 1), page_with_items(2, 1)]);
        view.navigate(1);
        view.load_document(vec![page_with_items(7, 1), page_with_items(8, 1)]);
        assert_eq!(view.pages().active_index(), 0);
        assert_eq!(view.pages().current_page().map(|p| p.page_number), Some(7));
    }

    #[test]
    fn test_shrinking_replace_pages_resets_index() {
        let mut view = ViewState::new();
        view.replace_pages(vec![page_with_items(1, 0), page_with_items(2, 0)]);
        view.navigate(1);
        view.replace_pages(vec![page_with_items(1, 0)]);
        assert_eq!(view.pages().active_index(), 0);
    }

    #[test]
    fn test_select_index_out_of_range() {
        let mut view = ViewState::new();
        assert!(view.select_index(0).is_none());
        view.load_document(vec![page_with_items(1, 1)]);
        assert!(view.select_index(3).is_none());
    }

    #[test]
    fn test_next_previous() {
        let mut view = ViewState::new();
        view.load_document(vec![page_with_items(1, 1), page_with_items(2, 1)]);
        assert!(!view.previous_page());
        assert!(view.next_page());
        assert!(!view.next_page());
        assert_eq!(view.pages().active_index(), 1);
    }

    #[test]
    fn test_hover_index() {
        let mut view = ViewState::new();
        view.load_document(vec![page_with_items(1, 2)]);
        view.hover_index(Some(1));
        assert!(view.selection().hovered().is_some());
        view.hover_index(None);
        assert!(view.selection().hovered().is_none());
    }
}
