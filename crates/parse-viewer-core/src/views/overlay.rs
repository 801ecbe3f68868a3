//! Overview view: clickable boxes laid over the annotated page image.
//!
//! Each item with a usable bounding box becomes one [`OverlayBox`] placed
//! through [`map_box`]. Items with fewer than four coordinates are skipped.
//! Until the image metrics are known every box has a zero-size rectangle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geometry::{map_box, ImageMetrics, ScreenRect};
use crate::identity::{resolve_identity, ItemKey};
use crate::models::Page;
use crate::selection::SelectionCoordinator;
use crate::views::copy::CopyFeedback;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayBox {
    pub key: ItemKey,
    /// Position of the item within its page.
    pub index: usize,
    pub rect: ScreenRect,
    pub kind: String,
    /// Reading-order badge: `order`, else the 1-based position.
    pub order: i64,
    pub selected: bool,
    pub hovered: bool,
    pub copied: bool,
    /// The copy control is offered on the selected box only.
    pub show_copy: bool,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewLayout {
    pub page_index: usize,
    /// `"<n> parts"`, counting every item on the page.
    pub header: String,
    pub boxes: Vec<OverlayBox>,
}

impl OverviewLayout {
    /// The box under a displayed-space point. Later boxes are drawn on top,
    /// so the last match wins.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&OverlayBox> {
        self.boxes.iter().rev().find(|b| b.rect.contains(x, y))
    }
}

/// Lay out the overview boxes of `page`.
pub fn overview_layout(
    page: &Page,
    page_index: usize,
    metrics: &ImageMetrics,
    selection: &SelectionCoordinator,
    feedback: &CopyFeedback,
    now: DateTime<Utc>,
) -> OverviewLayout {
    let boxes = page
        .items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let bbox = item.bounding_box()?;
            let key = resolve_identity(item, index);
            let selected = selection.is_selected(item, index, page_index);
            let label = item
                .text
                .as_deref()
                .filter(|t| !t.is_empty())
                .or_else(|| item.kind.as_ref().map(|k| k.as_str()))
                .unwrap_or("Item");
            Some(OverlayBox {
                copied: feedback.is_copied(&key, now),
                key,
                index,
                rect: map_box(metrics, &bbox),
                kind: item.kind_label("unknown").to_string(),
                order: item.rank(index),
                selected,
                hovered: selection.is_hovered(item, index, page_index),
                show_copy: selected,
                title: format!("Click to select: {}", label),
            })
        })
        .collect();
    OverviewLayout {
        page_index,
        header: format!("{} parts", page.items.len()),
        boxes,
    }
}
