//! Bounding boxes and the source-space → display-space coordinate mapper.
//!
//! The parsing backend reports boxes in the pixel space of the page image it
//! rendered (the image's *natural* size). Views show that image scaled to
//! whatever room they have (the *displayed* size). Every view that overlays
//! boxes on a page image goes through [`map_box`], so all of them agree on
//! where a block is.
//!
//! Coordinates are kept as `f64` through the whole mapping. Each coordinate
//! is computed as `value * displayed / natural` (multiply first, divide
//! last), which maps the full image box `[0, 0, W, H]` onto exactly
//! `[0, 0, displayed_w, displayed_h]` for integral sizes. Consumers that
//! need integer pixels call [`ScreenRect::to_pixels`], the only rounding
//! step in the crate.

use serde::{Deserialize, Serialize};

/// An axis-aligned box `[x1, y1, x2, y2]` in source-image pixels.
///
/// `x1 < x2` and `y1 < y2` are assumed but not enforced. A degenerate or
/// inverted box maps to a zero-area rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Build a box from the first four coordinates of a wire array.
    ///
    /// Returns `None` when fewer than four coordinates are present.
    pub fn from_coords(coords: &[f64]) -> Option<Self> {
        match coords {
            [x1, y1, x2, y2, ..] => Some(Self::new(*x1, *y1, *x2, *y2)),
            _ => None,
        }
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    /// Coordinates rounded to whole pixels, as shown in textual reports.
    pub fn rounded(&self) -> [i64; 4] {
        [
            self.x1.round() as i64,
            self.y1.round() as i64,
            self.x2.round() as i64,
            self.y2.round() as i64,
        ]
    }
}

/// Natural and displayed size of a page image.
///
/// The natural size is unknown until the image has loaded; use
/// [`ImageMetrics::unloaded`] for that state. Views recompute their layout
/// whenever the metrics change (image load, viewport resize).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageMetrics {
    pub natural_width: f64,
    pub natural_height: f64,
    pub displayed_width: f64,
    pub displayed_height: f64,
}

impl ImageMetrics {
    pub fn new(
        natural_width: f64,
        natural_height: f64,
        displayed_width: f64,
        displayed_height: f64,
    ) -> Self {
        Self {
            natural_width,
            natural_height,
            displayed_width,
            displayed_height,
        }
    }

    /// Metrics of an image that has not loaded yet. Every box maps to
    /// [`ScreenRect::ZERO`].
    pub fn unloaded() -> Self {
        Self::default()
    }

    /// Metrics for an image shown at a fixed width with its aspect ratio
    /// preserved (`width: 100%; height: auto`).
    pub fn fit_width(natural_width: f64, natural_height: f64, displayed_width: f64) -> Self {
        let displayed_height = if is_usable(natural_width) {
            natural_height * displayed_width / natural_width
        } else {
            0.0
        };
        Self::new(
            natural_width,
            natural_height,
            displayed_width,
            displayed_height,
        )
    }

    /// Whether the natural size is known and non-zero.
    pub fn is_loaded(&self) -> bool {
        is_usable(self.natural_width) && is_usable(self.natural_height)
    }

    /// Horizontal and vertical scale factors, or `None` before load.
    pub fn scale(&self) -> Option<(f64, f64)> {
        if !self.is_loaded() {
            return None;
        }
        Some((
            self.displayed_width / self.natural_width,
            self.displayed_height / self.natural_height,
        ))
    }
}

fn is_usable(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

/// A rectangle in displayed-image pixels, relative to the image's top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    /// The hidden rectangle used before image metrics are known.
    pub const ZERO: ScreenRect = ScreenRect {
        left: 0.0,
        top: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether a displayed-space point falls inside the rectangle.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }

    /// `(left, top, width, height)` rounded to whole pixels.
    pub fn to_pixels(&self) -> (i64, i64, i64, i64) {
        (
            self.left.round() as i64,
            self.top.round() as i64,
            self.width.round() as i64,
            self.height.round() as i64,
        )
    }
}

/// Map a source-space box onto the displayed image.
///
/// Returns [`ScreenRect::ZERO`] while the natural size is zero or unknown.
pub fn map_box(metrics: &ImageMetrics, bbox: &BoundingBox) -> ScreenRect {
    if !metrics.is_loaded() {
        return ScreenRect::ZERO;
    }
    let sx = |v: f64| v * metrics.displayed_width / metrics.natural_width;
    let sy = |v: f64| v * metrics.displayed_height / metrics.natural_height;
    ScreenRect {
        left: sx(bbox.x1),
        top: sy(bbox.y1),
        width: sx(bbox.width()),
        height: sy(bbox.height()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_box_maps_to_displayed_size() {
        for (nw, nh, dw, dh) in [
            (1000.0, 1400.0, 500.0, 700.0),
            (3.0, 7.0, 1.0, 1.0),
            (1654.0, 2339.0, 811.0, 1147.0),
            (640.0, 480.0, 1920.0, 1440.0),
        ] {
            let metrics = ImageMetrics::new(nw, nh, dw, dh);
            let rect = map_box(&metrics, &BoundingBox::new(0.0, 0.0, nw, nh));
            assert_eq!(
                rect,
                ScreenRect {
                    left: 0.0,
                    top: 0.0,
                    width: dw,
                    height: dh
                },
                "metrics {:?}",
                metrics
            );
        }
    }

    #[test]
    fn test_half_scale() {
        let metrics = ImageMetrics::new(1000.0, 2000.0, 500.0, 1000.0);
        let rect = map_box(&metrics, &BoundingBox::new(100.0, 200.0, 300.0, 600.0));
        assert_eq!(rect.left, 50.0);
        assert_eq!(rect.top, 100.0);
        assert_eq!(rect.width, 100.0);
        assert_eq!(rect.height, 200.0);
    }

    #[test]
    fn test_unloaded_image_yields_zero_rect() {
        let bbox = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        assert_eq!(map_box(&ImageMetrics::unloaded(), &bbox), ScreenRect::ZERO);
        let half_loaded = ImageMetrics::new(100.0, 0.0, 50.0, 50.0);
        assert_eq!(map_box(&half_loaded, &bbox), ScreenRect::ZERO);
        let nan = ImageMetrics::new(f64::NAN, 100.0, 50.0, 50.0);
        assert_eq!(map_box(&nan, &bbox), ScreenRect::ZERO);
    }

    #[test]
    fn test_degenerate_box_is_zero_area() {
        let metrics = ImageMetrics::new(100.0, 100.0, 200.0, 200.0);
        let flat = map_box(&metrics, &BoundingBox::new(10.0, 10.0, 10.0, 40.0));
        assert_eq!(flat.width, 0.0);
        assert!(flat.is_empty());
        let inverted = map_box(&metrics, &BoundingBox::new(50.0, 50.0, 10.0, 10.0));
        assert_eq!(inverted.width, 0.0);
        assert_eq!(inverted.height, 0.0);
    }

    #[test]
    fn test_fit_width_preserves_aspect() {
        let metrics = ImageMetrics::fit_width(1200.0, 1600.0, 600.0);
        assert_eq!(metrics.displayed_height, 800.0);
        assert_eq!(metrics.scale(), Some((0.5, 0.5)));
        assert_eq!(ImageMetrics::fit_width(0.0, 10.0, 600.0).displayed_height, 0.0);
    }

    #[test]
    fn test_from_coords_requires_four_values() {
        assert!(BoundingBox::from_coords(&[1.0, 2.0, 3.0]).is_none());
        assert_eq!(
            BoundingBox::from_coords(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            Some(BoundingBox::new(1.0, 2.0, 3.0, 4.0))
        );
    }

    #[test]
    fn test_to_pixels_rounds_once() {
        let rect = ScreenRect {
            left: 10.4,
            top: 10.5,
            width: 99.6,
            height: 0.2,
        };
        assert_eq!(rect.to_pixels(), (10, 11, 100, 0));
        assert!(rect.contains(10.5, 10.6));
        assert!(!rect.contains(200.0, 10.6));
    }
}
