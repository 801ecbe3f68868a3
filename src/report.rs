//! Plain-text and JSON rendering of viewer state for the CLI.
//!
//! Everything here is a pure function of already-built views so output can
//! be tested without a backend.

use parse_viewer_core::models::{HealthStatus, Page, RagStatus};
use parse_viewer_core::rag::RagSession;
use parse_viewer_core::views::overlay::OverviewLayout;
use parse_viewer_core::views::sources::SourceCard;
use serde_json::{json, Value};

/// `status: ok`, followed by any extra fields the backend reported.
pub fn format_health(health: &HealthStatus) -> String {
    let mut out = format!("status: {}", health.status);
    for (key, value) in &health.extra {
        out.push_str(&format!("\n{}: {}", key, value));
    }
    out
}

pub fn format_rag_status(status: &RagStatus) -> String {
    let mut out = if status.initialized {
        format!("initialized ({} chunks)", status.chunks_indexed)
    } else {
        "not initialized".to_string()
    };
    if let Some(dir) = &status.recognition_dir {
        out.push_str(&format!("\nrecognition_dir: {}", dir));
    }
    out
}

/// Page summary plus the overview layout of the active page.
///
/// `header` is the document view header (`Page i of n`) and `assets` the
/// resolved overlay and source image URLs.
pub fn format_page_text(
    file_name: &str,
    page_count: usize,
    header: &str,
    page: &Page,
    assets: (&str, Option<&str>),
    layout: &OverviewLayout,
) -> String {
    let mut lines = vec![
        format!("{}: {} page(s)", file_name, page_count),
        format!("{} (page number {})", header, page.page_number),
        format!("overlay: {}", assets.0),
    ];
    if let Some(source) = assets.1 {
        lines.push(format!("source:  {}", source));
    }
    lines.push(String::new());
    lines.push(layout.header.clone());
    for b in &layout.boxes {
        let (left, top, width, height) = b.rect.to_pixels();
        let text = page.items[b.index]
            .text_or_content()
            .map(|t| t.chars().take(60).collect::<String>().replace('\n', " "))
            .unwrap_or_default();
        lines.push(format!(
            "  #{:<3} {:<10} at ({}, {}) {}x{}  {}",
            b.order, b.kind, left, top, width, height, text
        ));
    }
    let skipped = page.items.len() - layout.boxes.len();
    if skipped > 0 {
        lines.push(format!("  ({} item(s) without a bounding box)", skipped));
    }
    lines.join("\n")
}

pub fn page_json(
    page_index: usize,
    page_count: usize,
    page: &Page,
    layout: &OverviewLayout,
) -> Value {
    json!({
        "page_index": page_index,
        "page_count": page_count,
        "page": page,
        "overview": layout,
    })
}

/// Answer followed by the source cards.
pub fn format_answer(session: &RagSession, cards: &[SourceCard]) -> String {
    let mut lines = vec![session.last_answer().unwrap_or_default().to_string()];
    if !cards.is_empty() {
        lines.push(String::new());
        lines.push(format!("Sources ({}):", cards.len()));
    }
    for card in cards {
        lines.push(format!("- {}  score {}  {}", card.heading, card.score, card.relevance));
        if !card.text.is_empty() {
            lines.push(format!("    {}", card.text));
        }
        for rel in &card.related {
            lines.push(format!("    + line {} ({:.3}): {}", rel.line, rel.score, rel.text));
        }
    }
    lines.join("\n")
}
