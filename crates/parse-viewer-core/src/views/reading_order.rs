//! Reading-order report, extracted-content markdown, and layout sorting.

use crate::models::{ContentItem, ItemKind};

/// Blocks whose top edges are within this many source pixels of a line's
/// first block belong to that line.
pub const DEFAULT_Y_TOLERANCE: f64 = 20.0;

const QUOTE_CHARS: usize = 160;

/// Markdown listing every block in array order with its type, rounded
/// bounding box, and a one-line quote of its text.
pub fn reading_order_markdown(items: &[ContentItem]) -> String {
    let mut lines = vec![
        "# Reading Order".to_string(),
        String::new(),
        "The following blocks appear in order on the page:".to_string(),
        String::new(),
    ];
    for (idx, item) in items.iter().enumerate() {
        let [x1, y1, x2, y2] = item.bounding_box().map(|b| b.rounded()).unwrap_or([0; 4]);
        lines.push(format!(
            "{}. **{}** - bbox: [{}, {}, {}, {}]",
            idx + 1,
            item.kind_label("paragraph"),
            x1,
            y1,
            x2,
            y2
        ));
        let quote: String = item
            .text
            .as_deref()
            .unwrap_or_default()
            .replace('\n', " ")
            .chars()
            .take(QUOTE_CHARS)
            .collect();
        if !quote.is_empty() {
            lines.push(format!("   > {}", quote));
        }
    }
    lines.join("\n")
}

/// [`reading_order_markdown`] with the blocks listed in layout order
/// instead of array order.
pub fn layout_reading_order_markdown(items: &[ContentItem], y_tolerance: f64) -> String {
    let ordered: Vec<ContentItem> = sort_by_layout(items, y_tolerance)
        .into_iter()
        .filter_map(|i| items.get(i).cloned())
        .collect();
    reading_order_markdown(&ordered)
}

/// The page's text as markdown, ordered by `order` (missing counts as 0,
/// ties keep array order) and formatted by block type.
pub fn extracted_markdown(items: &[ContentItem]) -> String {
    let mut sorted: Vec<&ContentItem> = items.iter().collect();
    sorted.sort_by_key(|item| item.order.unwrap_or(0));
    sorted
        .into_iter()
        .map(|item| {
            let text = item.text.as_deref().unwrap_or_default();
            match item.kind {
                Some(ItemKind::Heading) => format!("# {}", text),
                Some(ItemKind::Table) => format!("Table: {}", text),
                Some(ItemKind::Figure) => format!("Figure: {}", text),
                Some(ItemKind::Formula) => format!("Formula: {}", text),
                _ => text.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Indices of `items` in layout order: top to bottom by line, left to
/// right within a line. Items without a usable box go last, in array order.
pub fn sort_by_layout(items: &[ContentItem], y_tolerance: f64) -> Vec<usize> {
    let mut boxed: Vec<(usize, f64, f64)> = Vec::new();
    let mut unboxed = Vec::new();
    for (i, item) in items.iter().enumerate() {
        match item.bounding_box() {
            Some(b) => boxed.push((i, b.x1, b.y1)),
            None => unboxed.push(i),
        }
    }
    boxed.sort_by(|a, b| a.2.total_cmp(&b.2).then_with(|| a.1.total_cmp(&b.1)));

    let mut order = Vec::with_capacity(items.len());
    let mut line: Vec<(usize, f64, f64)> = Vec::new();
    let mut line_y: Option<f64> = None;
    for entry in boxed {
        match line_y {
            Some(y) if (entry.2 - y).abs() > y_tolerance => {
                flush_line(&mut line, &mut order);
                line_y = Some(entry.2);
            }
            None => line_y = Some(entry.2),
            _ => {}
        }
        line.push(entry);
    }
    flush_line(&mut line, &mut order);
    order.extend(unboxed);
    order
}

fn flush_line(line: &mut Vec<(usize, f64, f64)>, order: &mut Vec<usize>) {
    line.sort_by(|a, b| a.1.total_cmp(&b.1));
    order.extend(line.drain(..).map(|(i, _, _)| i));
}
