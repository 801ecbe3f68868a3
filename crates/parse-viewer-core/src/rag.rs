//! RAG session state machine.
//!
//! Tracks the client-side view of the retrieval service: whether an index
//! exists, how many chunks it holds, the last answer with its sources, the
//! last error, and whether a request is in flight.
//!
//! # Lifecycle
//!
//! ```text
//!            initialize()                 ok
//!   Empty ───────────────▶ Initializing ─────▶ Ready
//!     ▲                         │ err             │ query()
//!     └─────────────────────────┘                 ▼
//!                                              Querying ──▶ Ready
//! ```
//!
//! # Two-phase calls and request tokens
//!
//! Every call is split into `begin_*` (issues a [`RequestToken`] and
//! applies the optimistic state change) and `complete_*` (applies the
//! response). A completion is applied only when its token is the latest one
//! issued for that kind of request; an older response that arrives late is
//! dropped as [`Completion::Stale`]. Either way the call stops counting as
//! in flight, so `pending` goes back to `false` exactly once per call.
//!
//! The async helpers [`RagSession::initialize`], [`RagSession::query`] and
//! [`RagSession::refresh_status`] run both phases around a [`RagService`]
//! call for callers that do not interleave requests.

use serde::Serialize;

use crate::error::{RagError, ServiceError};
use crate::models::{QueryOptions, QueryRequest, QueryResponse, RagStatus, Source, InitRequest};
use crate::service::RagService;

/// Externally visible state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RagPhase {
    /// No index for the current corpus.
    Empty,
    /// An initialize call is in flight.
    Initializing,
    /// An index exists (possibly with zero chunks).
    Ready,
    /// A query is in flight.
    Querying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Initialize,
    Query,
}

/// Identifies one in-flight call. Only the session can mint tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    kind: RequestKind,
    seq: u64,
}

impl RequestToken {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

/// What happened to a completed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response was applied to the session.
    Applied,
    /// A newer call of the same kind was issued; the response was dropped.
    Stale,
    /// The token was not in flight (already completed, or wrong kind).
    Unknown,
}

/// A query accepted by [`RagSession::begin_query`], ready to be sent.
#[derive(Debug, Clone)]
pub struct PendingQuery {
    pub token: RequestToken,
    pub request: QueryRequest,
}

/// Result of the [`RagSession::query`] helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The question was blank; nothing was sent.
    Skipped,
    Completed(Completion),
}

/// Client-side RAG session.
#[derive(Debug, Clone)]
pub struct RagSession {
    initialized: bool,
    chunks_indexed: u64,
    recognition_dir: Option<String>,
    last_answer: Option<String>,
    last_sources: Vec<Source>,
    last_error: Option<String>,
    next_seq: u64,
    latest_init: Option<u64>,
    latest_query: Option<u64>,
    in_flight: Vec<RequestToken>,
    require_initialized: bool,
    query_options: QueryOptions,
}

impl Default for RagSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RagSession {
    /// An empty session that rejects queries until the index is initialized.
    pub fn new() -> Self {
        Self {
            initialized: false,
            chunks_indexed: 0,
            recognition_dir: None,
            last_answer: None,
            last_sources: Vec::new(),
            last_error: None,
            next_seq: 0,
            latest_init: None,
            latest_query: None,
            in_flight: Vec::new(),
            require_initialized: true,
            query_options: QueryOptions::default(),
        }
    }

    /// Whether [`begin_query`](Self::begin_query) rejects questions while
    /// the index is not initialized. When off, the question is sent anyway
    /// and the backend decides.
    pub fn with_require_initialized(mut self, require: bool) -> Self {
        self.require_initialized = require;
        self
    }

    /// Retrieval options attached to every query.
    pub fn with_query_options(mut self, options: QueryOptions) -> Self {
        self.query_options = options;
        self
    }

    // ============ Accessors ============

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Chunks in the index. Only meaningful while initialized.
    pub fn chunks_indexed(&self) -> u64 {
        self.chunks_indexed
    }

    pub fn recognition_dir(&self) -> Option<&str> {
        self.recognition_dir.as_deref()
    }

    pub fn last_answer(&self) -> Option<&str> {
        self.last_answer.as_deref()
    }

    pub fn last_sources(&self) -> &[Source] {
        &self.last_sources
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `true` while any initialize or query call is in flight.
    pub fn is_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn phase(&self) -> RagPhase {
        let in_flight = |kind| self.in_flight.iter().any(|t| t.kind == kind);
        if in_flight(RequestKind::Initialize) {
            RagPhase::Initializing
        } else if in_flight(RequestKind::Query) {
            RagPhase::Querying
        } else if self.initialized {
            RagPhase::Ready
        } else {
            RagPhase::Empty
        }
    }

    /// Status line shown next to the initialize control.
    pub fn status_label(&self) -> String {
        if self.initialized {
            format!("Ready ({} chunks)", self.chunks_indexed)
        } else {
            "Not initialized".to_string()
        }
    }

    // ============ Initialize ============

    /// Start an initialize call.
    pub fn begin_initialize(&mut self) -> RequestToken {
        self.last_error = None;
        let token = self.issue(RequestKind::Initialize);
        self.latest_init = Some(token.seq);
        tracing::debug!(seq = token.seq, "rag initialize started");
        token
    }

    /// Apply the outcome of an initialize call.
    ///
    /// Success marks the index ready with the server's chunk count; failure
    /// resets it to `{initialized: false, chunks: 0}` and records the error.
    pub fn complete_initialize(
        &mut self,
        token: RequestToken,
        result: Result<RagStatus, ServiceError>,
    ) -> Completion {
        if token.kind != RequestKind::Initialize || !self.retire(token) {
            return Completion::Unknown;
        }
        if self.latest_init != Some(token.seq) {
            tracing::debug!(seq = token.seq, "dropping stale rag initialize response");
            return Completion::Stale;
        }
        match result {
            Ok(status) => {
                // A successful build is an index, even when the body omits the flag.
                self.initialized = true;
                self.chunks_indexed = status.chunks_indexed;
                self.recognition_dir = status.recognition_dir;
                self.last_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "rag initialize failed");
                self.initialized = false;
                self.chunks_indexed = 0;
                self.recognition_dir = None;
                self.last_error = Some(err.to_string());
            }
        }
        Completion::Applied
    }

    // ============ Query ============

    /// Start a query.
    ///
    /// Returns `Ok(None)` for a blank question (nothing changes). When the
    /// session requires an index and has none, the query is rejected with
    /// [`RagError::NotInitialized`] and the message lands in `last_error`.
    /// Otherwise the previous answer, sources and error are cleared before
    /// the request is handed back for sending.
    pub fn begin_query(&mut self, question: &str, k: u32) -> Result<Option<PendingQuery>, RagError> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(None);
        }
        if self.require_initialized && !self.initialized {
            let err = RagError::NotInitialized;
            tracing::warn!("rejecting query: {}", err);
            self.last_error = Some(err.to_string());
            return Err(err);
        }
        self.last_answer = None;
        self.last_sources.clear();
        self.last_error = None;
        let token = self.issue(RequestKind::Query);
        self.latest_query = Some(token.seq);
        tracing::debug!(seq = token.seq, k, "rag query started");
        Ok(Some(PendingQuery {
            token,
            request: QueryRequest {
                question: question.to_string(),
                k,
                options: self.query_options.clone(),
            },
        }))
    }

    /// Apply the outcome of a query. `initialized` and the chunk count are
    /// never touched here.
    pub fn complete_query(
        &mut self,
        token: RequestToken,
        result: Result<QueryResponse, ServiceError>,
    ) -> Completion {
        if token.kind != RequestKind::Query || !self.retire(token) {
            return Completion::Unknown;
        }
        if self.latest_query != Some(token.seq) {
            tracing::debug!(seq = token.seq, "dropping stale rag query response");
            return Completion::Stale;
        }
        match result {
            Ok(resp) => {
                self.last_answer = Some(resp.answer);
                self.last_sources = resp.sources;
                self.last_error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "rag query failed");
                self.last_answer = None;
                self.last_sources.clear();
                self.last_error = Some(err.to_string());
            }
        }
        Completion::Applied
    }

    // ============ Status ============

    /// Apply a background status check. Failures keep the previous values
    /// and are not surfaced as errors. Returns whether the status changed
    /// the session.
    pub fn apply_status(&mut self, result: Result<RagStatus, ServiceError>) -> bool {
        match result {
            Ok(status) => {
                self.initialized = status.initialized;
                self.chunks_indexed = status.chunks_indexed;
                if status.recognition_dir.is_some() {
                    self.recognition_dir = status.recognition_dir;
                }
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "rag status check failed; keeping previous status");
                false
            }
        }
    }

    // ============ Async helpers ============

    /// Initialize the index through `service`.
    pub async fn initialize(
        &mut self,
        service: &dyn RagService,
        recognition_dir: Option<String>,
    ) -> Completion {
        let token = self.begin_initialize();
        let result = service.initialize(&InitRequest { recognition_dir }).await;
        self.complete_initialize(token, result)
    }

    /// Ask `question` through `service`.
    pub async fn query(
        &mut self,
        service: &dyn RagService,
        question: &str,
        k: u32,
    ) -> Result<QueryOutcome, RagError> {
        let Some(pending) = self.begin_query(question, k)? else {
            return Ok(QueryOutcome::Skipped);
        };
        let result = service.query(&pending.request).await;
        Ok(QueryOutcome::Completed(self.complete_query(pending.token, result)))
    }

    /// Refresh `initialized` / chunk count from `service`.
    pub async fn refresh_status(&mut self, service: &dyn RagService) -> bool {
        let result = service.status().await;
        self.apply_status(result)
    }

    // ============ Internals ============

    fn issue(&mut self, kind: RequestKind) -> RequestToken {
        self.next_seq += 1;
        let token = RequestToken {
            kind,
            seq: self.next_seq,
        };
        self.in_flight.push(token);
        token
    }

    fn retire(&mut self, token: RequestToken) -> bool {
        match self.in_flight.iter().position(|t| *t == token) {
            Some(pos) => {
                self.in_flight.swap_remove(pos);
                true
            }
            None => false,
        }
    }
}
