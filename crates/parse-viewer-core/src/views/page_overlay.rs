//! Page overlay view: the backend's rendered overlay image of the active
//! page, with its own page counter and navigation dots.

use serde::Serialize;

use super::document::{nav_dots, NavDot};
use crate::pages::PageCollection;

/// What the overlay panel shows in place of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayEmpty {
    /// Nothing has been processed yet.
    NoOverlays,
    /// The active page has no overlay, or its image failed to load.
    Unavailable,
}

impl OverlayEmpty {
    pub fn message(&self) -> &'static str {
        match self {
            OverlayEmpty::NoOverlays => "No Overlays",
            OverlayEmpty::Unavailable => "No overlay available",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageOverlayView {
    /// Server-relative overlay image of the active page.
    pub image: Option<String>,
    /// `"i / n"`; absent with no pages.
    pub header: Option<String>,
    /// Empty unless there is more than one page.
    pub dots: Vec<NavDot>,
    /// Set exactly when `image` is `None`.
    pub empty: Option<OverlayEmpty>,
}

/// Build the overlay view for the active page.
///
/// `image_failed` is the caller's record that the active page's overlay
/// could not be loaded.
pub fn page_overlay_view(pages: &PageCollection, image_failed: bool) -> PageOverlayView {
    let Some(page) = pages.current_page() else {
        return PageOverlayView {
            image: None,
            header: None,
            dots: Vec::new(),
            empty: Some(OverlayEmpty::NoOverlays),
        };
    };
    let image = (!page.overlay_image_ref.is_empty() && !image_failed)
        .then(|| page.overlay_image_ref.clone());
    PageOverlayView {
        empty: image.is_none().then_some(OverlayEmpty::Unavailable),
        image,
        header: Some(format!("{} / {}", pages.active_index() + 1, pages.len())),
        dots: nav_dots(pages),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;

    fn page(n: u32, overlay: &str) -> Page {
        Page {
            page_number: n,
            items: vec![],
            overlay_image_ref: overlay.to_string(),
            source_image_ref: None,
        }
    }

    fn collection(pages: Vec<Page>) -> PageCollection {
        let mut c = PageCollection::new();
        c.replace_all(pages);
        c
    }

    #[test]
    fn test_no_pages() {
        let view = page_overlay_view(&PageCollection::new(), false);
        assert_eq!(view.empty, Some(OverlayEmpty::NoOverlays));
        assert_eq!(view.empty.map(|e| e.message()), Some("No Overlays"));
        assert!(view.image.is_none());
        assert!(view.header.is_none());
        assert!(view.dots.is_empty());
    }

    #[test]
    fn test_missing_overlay_ref() {
        let view = page_overlay_view(&collection(vec![page(1, "")]), false);
        assert_eq!(view.empty, Some(OverlayEmpty::Unavailable));
        assert_eq!(view.empty.map(|e| e.message()), Some("No overlay available"));
        assert_eq!(view.header.as_deref(), Some("1 / 1"));
        assert!(view.dots.is_empty());
    }

    #[test]
    fn test_failed_image_is_unavailable() {
        let view = page_overlay_view(&collection(vec![page(1, "/o/1.png")]), true);
        assert!(view.image.is_none());
        assert_eq!(view.empty, Some(OverlayEmpty::Unavailable));
    }

    #[test]
    fn test_multi_page_follows_active_index() {
        let mut pages = collection(vec![page(1, "/o/1.png"), page(2, "/o/2.png"), page(3, "")]);
        pages.set_active_index(1);
        let view = page_overlay_view(&pages, false);
        assert_eq!(view.image.as_deref(), Some("/o/2.png"));
        assert!(view.empty.is_none());
        assert_eq!(view.header.as_deref(), Some("2 / 3"));
        assert_eq!(view.dots.len(), 3);
        assert!(view.dots[1].active);
        assert!(!view.dots[0].active);

        pages.set_active_index(2);
        let view = page_overlay_view(&pages, false);
        assert_eq!(view.header.as_deref(), Some("3 / 3"));
        assert_eq!(view.empty, Some(OverlayEmpty::Unavailable));
    }
}
