//! Document view: the unannotated page plus page navigation.

use serde::Serialize;

use crate::models::Upload;
use crate::pages::PageCollection;

/// What the document view displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentSource {
    /// Nothing uploaded and no pages.
    NoDocument,
    /// The uploaded file itself (single-image uploads).
    LocalFile { file_name: String },
    /// A page image on the server; `path` is server-relative.
    PageImage { path: String },
    /// Pages exist but the active one has no source image yet.
    Processing,
}

/// One navigation dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavDot {
    pub index: usize,
    pub page_number: u32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentView {
    pub source: DocumentSource,
    /// `"Page i of n"`, shown with server page images.
    pub header: Option<String>,
    /// Empty unless there is more than one page.
    pub dots: Vec<NavDot>,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Build the document view for the active page.
pub fn document_view(pages: &PageCollection, uploaded: Option<&Upload>) -> DocumentView {
    let source = match uploaded {
        Some(upload) if upload.is_image() => DocumentSource::LocalFile {
            file_name: upload.file_name.clone(),
        },
        _ if uploaded.is_none() && pages.is_empty() => DocumentSource::NoDocument,
        _ => match pages.current_page().and_then(|p| p.source_image_ref.clone()) {
            Some(path) => DocumentSource::PageImage { path },
            None => DocumentSource::Processing,
        },
    };
    let header = matches!(source, DocumentSource::PageImage { .. })
        .then(|| page_header(pages))
        .flatten();
    DocumentView {
        source,
        header,
        dots: nav_dots(pages),
        has_previous: pages.previous_index().is_some(),
        has_next: pages.next_index().is_some(),
    }
}

/// `"Page i of n"` for the active page, or `None` with no pages.
pub fn page_header(pages: &PageCollection) -> Option<String> {
    if pages.is_empty() {
        return None;
    }
    Some(format!("Page {} of {}", pages.active_index() + 1, pages.len()))
}

pub fn nav_dots(pages: &PageCollection) -> Vec<NavDot> {
    if pages.len() <= 1 {
        return Vec::new();
    }
    pages
        .pages()
        .iter()
        .enumerate()
        .map(|(index, page)| NavDot {
            index,
            page_number: page.page_number,
            active: index == pages.active_index(),
        })
        .collect()
}
