//! The page collection: the ordered page list of the current document and
//! which page is active.

use crate::models::Page;

/// Ordered pages of the current document plus the active page index.
///
/// The active index is always in bounds while there are pages; with no
/// pages it is `0` and [`current_page`](PageCollection::current_page)
/// returns `None`.
#[derive(Debug, Clone, Default)]
pub struct PageCollection {
    pages: Vec<Page>,
    active: usize,
}

impl PageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a complete new page list.
    ///
    /// The active index is kept when it is still in range and reset to `0`
    /// otherwise.
    pub fn replace_all(&mut self, pages: Vec<Page>) {
        self.pages = pages;
        if self.active >= self.pages.len() {
            self.active = 0;
        }
    }

    /// Make page `index` active. Out-of-range indices are ignored.
    ///
    /// Returns `true` when the index was accepted.
    pub fn set_active_index(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        self.active = index;
        true
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.pages.get(self.active)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Index of the page after the active one, saturating at the last page.
    pub fn next_index(&self) -> Option<usize> {
        let next = self.active + 1;
        (next < self.pages.len()).then_some(next)
    }

    /// Index of the page before the active one, saturating at the first page.
    pub fn previous_index(&self) -> Option<usize> {
        if self.pages.is_empty() {
            return None;
        }
        self.active.checked_sub(1)
    }
}
