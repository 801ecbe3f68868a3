//! Source cards shown under a RAG answer.

use serde::Serialize;

use crate::models::{RelatedSource, Source};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceCard {
    /// `"Page <p>, Line <l>"`.
    pub heading: String,
    /// Score with three decimals.
    pub score: String,
    pub text: String,
    /// Relevance clamped to `[0, 100]`, used as the bar width.
    pub bar_percent: f64,
    /// `"Relevance: <n>%"`, rounded.
    pub relevance: String,
    pub related: Vec<RelatedSource>,
}

/// `"<n> items"` header of the sources panel.
pub fn sources_header(sources: &[Source]) -> String {
    format!("{} items", sources.len())
}

pub fn source_cards(sources: &[Source]) -> Vec<SourceCard> {
    sources.iter().map(source_card).collect()
}

pub fn source_card(source: &Source) -> SourceCard {
    let percent = if source.relevance_percent.is_finite() {
        source.relevance_percent
    } else {
        0.0
    };
    SourceCard {
        heading: format!("Page {}, Line {}", source.page, source.line),
        score: format!("{:.3}", source.score),
        text: source.text.clone(),
        bar_percent: percent.clamp(0.0, 100.0),
        relevance: format!("Relevance: {}%", round_half_up(percent)),
        related: source.related.clone(),
    }
}

/// Rounds halves toward positive infinity and never yields `-0`.
fn round_half_up(value: f64) -> f64 {
    let rounded = (value + 0.5).floor();
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
