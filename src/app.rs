//! The coordinating context of one viewer session.
//!
//! [`ViewerApp`] owns every state container (pages and selection, the RAG
//! session, upload and health state, tree and copy state, overlay load
//! failures) and is the only writer of each. Views are built on demand from the current state.
//!
//! # Upload flow
//!
//! 1. `uploading = true`, the upload error and selection are cleared
//! 2. the file is sent to the parsing service
//! 3. success installs the new pages at page 0 and refreshes the RAG status;
//!    failure records the error and keeps the previous pages
//! 4. `uploading = false`, then the health status is refreshed

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use parse_viewer_core::error::{RagError, ServiceError};
use parse_viewer_core::geometry::ImageMetrics;
use parse_viewer_core::models::{HealthStatus, Page, Upload};
use parse_viewer_core::rag::{Completion, QueryOutcome, RagSession};
use parse_viewer_core::service::{ParseService, RagService};
use parse_viewer_core::view::ViewState;
use parse_viewer_core::views::copy::{copy_text, CopyFeedback};
use parse_viewer_core::views::document::{document_view, DocumentView};
use parse_viewer_core::views::overlay::{overview_layout, OverviewLayout};
use parse_viewer_core::views::page_overlay::{page_overlay_view, PageOverlayView};
use parse_viewer_core::views::reading_order::{
    extracted_markdown, layout_reading_order_markdown, reading_order_markdown,
};
use parse_viewer_core::views::sources::{source_cards, SourceCard};
use parse_viewer_core::views::tree::{selected_info, tree_rows, SelectedInfo, TreeRow, TreeViewState};

use crate::config::Config;
use crate::progress::{NoProgress, ProgressEvent, ProgressReporter};

/// State of the upload panel.
#[derive(Debug, Clone, Default)]
pub struct UploadState {
    pub uploading: bool,
    pub error: Option<String>,
    /// The file chosen for the current document.
    pub file: Option<Upload>,
}

pub struct ViewerApp<S> {
    service: S,
    view: ViewState,
    rag: RagSession,
    upload: UploadState,
    health: HealthStatus,
    tree: TreeViewState,
    copy: CopyFeedback,
    /// Page indices whose overlay image could not be loaded.
    overlay_failures: HashSet<usize>,
    default_k: u32,
    recognition_dir: Option<String>,
    progress: Box<dyn ProgressReporter>,
}

impl<S: ParseService + RagService> ViewerApp<S> {
    pub fn new(service: S, config: &Config) -> Self {
        let mut tree = TreeViewState::new();
        tree.sync_page(0);
        Self {
            service,
            view: ViewState::new(),
            rag: RagSession::new()
                .with_require_initialized(config.rag.require_initialized)
                .with_query_options(config.rag.query_options()),
            upload: UploadState::default(),
            health: HealthStatus::unknown(),
            tree,
            copy: CopyFeedback::new(config.viewer.copy_feedback_ms),
            overlay_failures: HashSet::new(),
            default_k: config.rag.default_k,
            recognition_dir: config.rag.recognition_dir.clone(),
            progress: Box::new(NoProgress),
        }
    }

    pub fn with_progress(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    // ============ Accessors ============

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn rag(&self) -> &RagSession {
        &self.rag
    }

    pub fn upload_state(&self) -> &UploadState {
        &self.upload
    }

    pub fn health(&self) -> &HealthStatus {
        &self.health
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.view.pages().current_page()
    }

    pub fn tree_state_mut(&mut self) -> &mut TreeViewState {
        &mut self.tree
    }

    // ============ Backend calls ============

    /// Refresh the health status. Never fails.
    pub async fn check_health(&mut self) -> &HealthStatus {
        self.health = self.service.health().await;
        &self.health
    }

    /// Upload `upload` and install the resulting pages.
    ///
    /// Returns the number of pages on success. On failure the message is
    /// also kept in the upload error slot and the previous pages remain.
    pub async fn upload(&mut self, upload: Upload) -> Result<usize, ServiceError> {
        self.upload.uploading = true;
        self.upload.error = None;
        self.view.clear_selection();
        self.progress.report(ProgressEvent::Uploading {
            file: upload.file_name.clone(),
            bytes: upload.bytes.len() as u64,
        });

        let result = self.service.process(&upload).await;
        self.upload.file = Some(upload);
        let outcome = match result {
            Ok(resp) => {
                let pages = resp.into_pages();
                let count = pages.len();
                tracing::debug!(pages = count, "upload processed");
                self.view.load_document(pages);
                self.overlay_failures.clear();
                self.sync_tree();
                if let Some(file) = &self.upload.file {
                    self.progress.report(ProgressEvent::Processed {
                        file: file.file_name.clone(),
                        pages: count,
                    });
                }
                self.rag.refresh_status(&self.service).await;
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(error = %err, "upload failed");
                self.upload.error = Some(err.to_string());
                Err(err)
            }
        };

        self.upload.uploading = false;
        self.check_health().await;
        outcome
    }

    pub async fn initialize_rag(&mut self) -> Completion {
        self.progress.report(ProgressEvent::Indexing);
        let done = self
            .rag
            .initialize(&self.service, self.recognition_dir.clone())
            .await;
        if self.rag.is_initialized() {
            self.progress.report(ProgressEvent::Indexed {
                chunks: self.rag.chunks_indexed(),
            });
        }
        done
    }

    /// Ask with the configured `k`.
    pub async fn ask(&mut self, question: &str) -> Result<QueryOutcome, RagError> {
        self.ask_with_k(question, self.default_k).await
    }

    pub async fn ask_with_k(&mut self, question: &str, k: u32) -> Result<QueryOutcome, RagError> {
        if !question.trim().is_empty() {
            self.progress.report(ProgressEvent::Querying { k });
        }
        self.rag.query(&self.service, question, k).await
    }

    pub async fn refresh_rag_status(&mut self) -> bool {
        self.rag.refresh_status(&self.service).await
    }

    // ============ Navigation and selection ============

    pub fn navigate(&mut self, index: usize) -> bool {
        let moved = self.view.navigate(index);
        self.sync_tree();
        moved
    }

    pub fn next_page(&mut self) -> bool {
        let moved = self.view.next_page();
        self.sync_tree();
        moved
    }

    pub fn previous_page(&mut self) -> bool {
        let moved = self.view.previous_page();
        self.sync_tree();
        moved
    }

    /// Select the item at `index` on the active page.
    pub fn select(&mut self, index: usize) -> bool {
        self.view.select_index(index).is_some()
    }

    pub fn hover(&mut self, index: Option<usize>) {
        self.view.hover_index(index);
    }

    pub fn clear_selection(&mut self) {
        self.view.clear_selection();
    }

    /// Copy text of the item at `index`, marking it as copied at `now`.
    pub fn copy_item(&mut self, index: usize, now: DateTime<Utc>) -> Option<String> {
        let item = self.current_page()?.items.get(index)?;
        let text = copy_text(item);
        let key = parse_viewer_core::identity::resolve_identity(item, index);
        self.copy.mark(key, now);
        Some(text)
    }

    /// Record that the active page's overlay image failed to load.
    pub fn mark_overlay_failed(&mut self) {
        if !self.view.pages().is_empty() {
            self.overlay_failures
                .insert(self.view.pages().active_index());
        }
    }

    fn sync_tree(&mut self) {
        self.tree.sync_page(self.view.pages().active_index());
    }

    // ============ Views ============

    pub fn document_view(&self) -> DocumentView {
        document_view(self.view.pages(), self.upload.file.as_ref())
    }

    pub fn page_overlay_view(&self) -> PageOverlayView {
        let pages = self.view.pages();
        page_overlay_view(pages, self.overlay_failures.contains(&pages.active_index()))
    }

    pub fn overview(&self, metrics: &ImageMetrics, now: DateTime<Utc>) -> Option<OverviewLayout> {
        let page = self.current_page()?;
        Some(overview_layout(
            page,
            self.view.pages().active_index(),
            metrics,
            self.view.selection(),
            &self.copy,
            now,
        ))
    }

    pub fn tree_rows(&self, now: DateTime<Utc>) -> Vec<TreeRow> {
        match self.current_page() {
            Some(page) => tree_rows(
                &self.tree,
                page,
                self.view.pages().active_index(),
                self.view.selection(),
                &self.copy,
                now,
            ),
            None => Vec::new(),
        }
    }

    pub fn selected_info(&self) -> Option<SelectedInfo> {
        self.view.selection().selected().map(selected_info)
    }

    pub fn reading_order_markdown(&self) -> String {
        reading_order_markdown(self.current_items())
    }

    /// Reading order by position on the page rather than backend order.
    pub fn layout_reading_order_markdown(&self, y_tolerance: f64) -> String {
        layout_reading_order_markdown(self.current_items(), y_tolerance)
    }

    pub fn extracted_markdown(&self) -> String {
        extracted_markdown(self.current_items())
    }

    pub fn source_cards(&self) -> Vec<SourceCard> {
        source_cards(self.rag.last_sources())
    }

    fn current_items(&self) -> &[parse_viewer_core::models::ContentItem] {
        self.current_page().map(|p| p.items.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parse_viewer_core::models::{ProcessResponse, QueryResponse};
    use parse_viewer_core::service::memory::InMemoryService;
    use parse_viewer_core::views::document::DocumentSource;
    use parse_viewer_core::views::page_overlay::OverlayEmpty;
    use serde_json::json;

    fn pdf(pages: serde_json::Value) -> ProcessResponse {
        serde_json::from_value(json!({"type": "pdf", "pages": pages})).unwrap()
    }

    fn two_pages() -> ProcessResponse {
        pdf(json!([
            {"page": 1, "items": [{"id": "a", "type": "heading", "bbox": [0, 0, 100, 20], "text": "Title"}],
             "overlay_url": "/o/1.png", "original_url": "/s/1.png"},
            {"page": 2, "items": [{"bbox": [0, 0, 50, 50]}, {"bbox": [60, 0, 90, 50], "text": "x"}],
             "overlay_url": "/o/2.png", "original_url": "/s/2.png"}
        ]))
    }

    fn app() -> ViewerApp<InMemoryService> {
        ViewerApp::new(InMemoryService::new(), &Config::default())
    }

    #[tokio::test]
    async fn test_upload_installs_pages_and_refreshes() {
        let mut app = app();
        app.service().set_process_result(Ok(two_pages()));
        app.service().set_initialized(11);

        let count = app.upload(Upload::new("report.pdf", vec![1, 2, 3])).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(app.view().pages().active_index(), 0);
        assert_eq!(app.current_page().unwrap().overlay_image_ref, "/o/1.png");
        assert!(!app.upload_state().uploading);
        assert_eq!(app.health().status, "ok");
        assert_eq!(app.rag().chunks_indexed(), 11);
        assert_eq!(app.service().uploads(), vec!["report.pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_pages() {
        let mut app = app();
        app.service().set_process_result(Ok(two_pages()));
        app.upload(Upload::new("a.pdf", vec![])).await.unwrap();
        app.navigate(1);
        app.select(0);

        app.service()
            .set_process_result(Err(ServiceError::from_response("Upload", 500, "")));
        app.service().set_health(HealthStatus::error());
        let err = app.upload(Upload::new("b.pdf", vec![])).await.unwrap_err();

        assert_eq!(err.to_string(), "Upload failed: 500");
        assert_eq!(app.upload_state().error.as_deref(), Some("Upload failed: 500"));
        assert_eq!(app.view().pages().len(), 2);
        assert!(app.view().selection().selected().is_none());
        assert_eq!(app.health().status, "error");
        assert!(!app.upload_state().uploading);
    }

    #[tokio::test]
    async fn test_navigation_resets_tree_and_selection() {
        let mut app = app();
        app.service().set_process_result(Ok(two_pages()));
        app.upload(Upload::new("a.pdf", vec![])).await.unwrap();
        app.select(0);
        app.tree_state_mut().expand_all(1);
        assert!(app.tree_rows(Utc::now())[0].expanded);

        assert!(app.navigate(1));
        assert!(app.selected_info().is_none());
        assert!(app.tree_rows(Utc::now()).iter().all(|r| !r.expanded));
        assert!(!app.navigate(9));
        assert_eq!(app.view().pages().active_index(), 1);
    }

    #[tokio::test]
    async fn test_views_share_selection() {
        let mut app = app();
        app.service().set_process_result(Ok(two_pages()));
        app.upload(Upload::new("a.pdf", vec![])).await.unwrap();
        app.next_page();
        assert!(app.select(1));

        let now = Utc::now();
        let metrics = ImageMetrics::new(100.0, 100.0, 200.0, 200.0);
        let overview = app.overview(&metrics, now).unwrap();
        let rows = app.tree_rows(now);
        assert!(overview.boxes[1].selected && !overview.boxes[0].selected);
        assert!(rows[1].selected && !rows[0].selected);
        assert_eq!(app.selected_info().unwrap().text_preview.as_deref(), Some("x"));

        assert_eq!(app.copy_item(1, now).as_deref(), Some("x"));
        assert!(app.overview(&metrics, now).unwrap().boxes[1].copied);
        assert!(app.tree_rows(now)[1].copied);
    }

    #[tokio::test]
    async fn test_document_view_after_upload() {
        let mut app = app();
        assert_eq!(app.document_view().source, DocumentSource::NoDocument);
        app.service().set_process_result(Ok(two_pages()));
        app.upload(Upload::new("a.pdf", vec![])).await.unwrap();
        let doc = app.document_view();
        assert_eq!(
            doc.source,
            DocumentSource::PageImage {
                path: "/s/1.png".into()
            }
        );
        assert_eq!(doc.header.as_deref(), Some("Page 1 of 2"));
    }

    #[tokio::test]
    async fn test_page_overlay_view_tracks_failures_per_page() {
        let mut app = app();
        assert_eq!(app.page_overlay_view().empty, Some(OverlayEmpty::NoOverlays));

        app.service().set_process_result(Ok(two_pages()));
        app.upload(Upload::new("a.pdf", vec![])).await.unwrap();
        let view = app.page_overlay_view();
        assert_eq!(view.image.as_deref(), Some("/o/1.png"));
        assert_eq!(view.header.as_deref(), Some("1 / 2"));
        assert_eq!(view.dots.len(), 2);

        app.mark_overlay_failed();
        assert_eq!(app.page_overlay_view().empty, Some(OverlayEmpty::Unavailable));
        assert!(app.next_page());
        assert_eq!(app.page_overlay_view().image.as_deref(), Some("/o/2.png"));
        assert!(app.page_overlay_view().dots[1].active);

        app.upload(Upload::new("b.pdf", vec![])).await.unwrap();
        assert_eq!(app.page_overlay_view().image.as_deref(), Some("/o/1.png"));
    }

    #[tokio::test]
    async fn test_rag_flow() {
        let mut app = app();
        assert_eq!(app.ask("anything").await, Err(RagError::NotInitialized));

        app.service().set_chunks_on_init(4);
        app.service().set_answer(
            serde_json::from_value::<QueryResponse>(json!({
                "answer": "42",
                "sources": [{"page": 2, "line": 5, "text": "...", "score": 0.91, "percentage": 91}]
            }))
            .unwrap(),
        );
        assert_eq!(app.initialize_rag().await, Completion::Applied);
        assert_eq!(app.rag().chunks_indexed(), 4);

        let outcome = app.ask("what is the total?").await.unwrap();
        assert_eq!(outcome, QueryOutcome::Completed(Completion::Applied));
        assert_eq!(app.rag().last_answer(), Some("42"));
        assert_eq!(app.source_cards()[0].relevance, "Relevance: 91%");
        assert_eq!(app.service().queries()[0].k, 3);
    }
}
