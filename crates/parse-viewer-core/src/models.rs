//! Core data models: pages, content items, RAG sources, and the wire shapes
//! exchanged with the parsing and RAG services.
//!
//! Deserialization is deliberately forgiving. The backend omits fields, sends
//! `null` for empty ones, and mixes numeric and string ids, so every field
//! defaults instead of failing, and `null` never reaches a view.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::geometry::BoundingBox;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

// ============ Content items ============

/// Block type reported by the layout model.
///
/// The set is open: tags the viewer does not know are kept verbatim in
/// [`ItemKind::Other`] and shown as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemKind {
    Paragraph,
    Heading,
    Table,
    Figure,
    Formula,
    Footer,
    Unknown,
    Other(String),
}

impl ItemKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading => "heading",
            Self::Table => "table",
            Self::Figure => "figure",
            Self::Formula => "formula",
            Self::Footer => "footer",
            Self::Unknown => "unknown",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for ItemKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "paragraph" => Self::Paragraph,
            "heading" => Self::Heading,
            "table" => Self::Table,
            "figure" => Self::Figure,
            "formula" => Self::Formula,
            "footer" | "foot" => Self::Footer,
            "unknown" => Self::Unknown,
            _ => Self::Other(tag),
        }
    }
}

impl From<ItemKind> for String {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An explicit item id as sent by the backend: either a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(serde_json::Number),
    Text(String),
}

impl ItemId {
    /// Empty or whitespace-only string ids count as "no id".
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One detected structural block on a page.
///
/// Fields the viewer does not interpret are kept in `extra` so the
/// structural tree view can show the item exactly as the backend sent it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    /// Raw `[x1, y1, x2, y2]` coordinates in source-image pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentItem {
    /// The bounding box, if at least four coordinates were reported.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bbox.as_deref().and_then(BoundingBox::from_coords)
    }

    /// Block type label, using `default` when the backend sent none.
    pub fn kind_label<'a>(&'a self, default: &'a str) -> &'a str {
        self.kind.as_ref().map(ItemKind::as_str).unwrap_or(default)
    }

    /// Reading-order rank: the reported `order`, else the 1-based position.
    pub fn rank(&self, index: usize) -> i64 {
        self.order.unwrap_or(index as i64 + 1)
    }

    /// Extracted text, falling back to the `content` field. Empty strings
    /// count as missing.
    pub fn text_or_content(&self) -> Option<&str> {
        self.text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.content.as_deref().filter(|c| !c.is_empty()))
    }
}

// ============ Pages ============

/// One page of parse output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number. `0` on the wire means "not reported" and is
    /// replaced by the page's position when the page list is built.
    #[serde(rename = "page", default, deserialize_with = "null_as_default")]
    pub page_number: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<ContentItem>,
    /// Server-relative path of the annotated overlay image.
    #[serde(rename = "overlay_url", default, deserialize_with = "null_as_default")]
    pub overlay_image_ref: String,
    /// Server-relative path of the unannotated page image. Absent for
    /// single-image uploads, where the uploaded file stands in.
    #[serde(
        rename = "original_url",
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_image_ref: Option<String>,
}

// ============ Parsing service wire types ============

/// A file to send to the parsing service.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tif", "tiff"];

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Whether the file is a raster image (judged by extension), in which
    /// case the document view shows the file itself.
    pub fn is_image(&self) -> bool {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

/// Response of `POST /api/process`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessResponse {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<ContentItem>>,
    #[serde(default)]
    pub overlay_url: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub pages: Option<Vec<Page>>,
}

impl ProcessResponse {
    /// Turn the response into the full replacement page list.
    ///
    /// `image` responses become one synthesized page, `pdf` responses use
    /// `pages` directly, anything else yields no pages.
    pub fn into_pages(self) -> Vec<Page> {
        let mut pages = match self.kind.as_deref() {
            Some("image") => vec![Page {
                page_number: 1,
                items: self.items.unwrap_or_default(),
                overlay_image_ref: self.overlay_url.unwrap_or_default(),
                source_image_ref: self.original_url.filter(|s| !s.trim().is_empty()),
            }],
            Some("pdf") => self.pages.unwrap_or_default(),
            _ => Vec::new(),
        };
        for (i, page) in pages.iter_mut().enumerate() {
            if page.page_number == 0 {
                page.page_number = i as u32 + 1;
            }
        }
        pages
    }
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default = "default_health_status")]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_health_status() -> String {
    "unknown".to_string()
}

impl HealthStatus {
    pub fn with_status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            extra: Map::new(),
        }
    }

    /// The value used whenever the health check fails.
    pub fn error() -> Self {
        Self::with_status("error")
    }

    /// The value before the first check completes.
    pub fn unknown() -> Self {
        Self::with_status("unknown")
    }
}

// ============ RAG wire types ============

/// Body of `POST /rag/init`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InitRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognition_dir: Option<String>,
}

/// Response of `POST /rag/init` and `GET /rag/status`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RagStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub initialized: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chunks_indexed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognition_dir: Option<String>,
}

impl RagStatus {
    /// The value used whenever the status check fails.
    pub fn not_initialized() -> Self {
        Self::default()
    }
}

/// Optional retrieval tuning forwarded with every query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_relations: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_window: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_group_items: Option<u32>,
}

/// Body of `POST /rag/query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub question: String,
    pub k: u32,
    #[serde(flatten)]
    pub options: QueryOptions,
}

/// A neighbouring line the retriever grouped with a source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RelatedSource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub page: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub line: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

/// One retrieved passage backing an answer.
///
/// The relevance share is canonically `relevance_percent`. On the wire the
/// backend sends `percentage` (current) or `percent` (older builds); when
/// both are present `percentage` wins.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "WireSource")]
pub struct Source {
    pub page: u32,
    pub line: u32,
    pub text: String,
    pub score: f64,
    pub relevance_percent: f64,
    pub related: Vec<RelatedSource>,
}

#[derive(Deserialize)]
struct WireSource {
    #[serde(default, deserialize_with = "null_as_default")]
    page: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    line: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    score: f64,
    #[serde(default)]
    percentage: Option<f64>,
    #[serde(default)]
    percent: Option<f64>,
    #[serde(default)]
    relevance_percent: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    related: Vec<RelatedSource>,
}

impl From<WireSource> for Source {
    fn from(w: WireSource) -> Self {
        Self {
            page: w.page,
            line: w.line,
            text: w.text,
            score: w.score,
            relevance_percent: w
                .percentage
                .or(w.percent)
                .or(w.relevance_percent)
                .unwrap_or(0.0),
            related: w.related,
        }
    }
}

/// Response of `POST /rag/query`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<Source>,
}
