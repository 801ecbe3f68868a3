//! Service abstraction for the parsing and RAG backends.
//!
//! The [`ParseService`] and [`RagService`] traits are the only way the core
//! talks to the outside world, enabling pluggable backends (the reqwest
//! client in the app crate, the in-memory fake in [`memory`], a future
//! browser `fetch` binding).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::models::{
    HealthStatus, InitRequest, ProcessResponse, QueryRequest, QueryResponse, RagStatus, Upload,
};

/// The document-parsing backend.
///
/// | Method | Endpoint |
/// |--------|----------|
/// | [`process`](ParseService::process) | `POST /api/process` |
/// | [`health`](ParseService::health) | `GET /api/health` |
#[async_trait]
pub trait ParseService: Send + Sync {
    /// Upload a file and return the raw parse response.
    async fn process(&self, upload: &Upload) -> Result<ProcessResponse, ServiceError>;

    /// Check backend health. Never fails: any failure is reported as
    /// [`HealthStatus::error`].
    async fn health(&self) -> HealthStatus;
}

/// The retrieval-augmented QA backend.
///
/// | Method | Endpoint |
/// |--------|----------|
/// | [`initialize`](RagService::initialize) | `POST /rag/init` |
/// | [`status`](RagService::status) | `GET /rag/status` |
/// | [`query`](RagService::query) | `POST /rag/query` |
#[async_trait]
pub trait RagService: Send + Sync {
    /// Build (or rebuild) the index over the parsed corpus.
    async fn initialize(&self, request: &InitRequest) -> Result<RagStatus, ServiceError>;

    /// Read the index status.
    ///
    /// Failures are returned as errors so the session can keep its previous
    /// values; callers that want the `{initialized: false, chunks_indexed: 0}`
    /// fallback use `unwrap_or_default()`.
    async fn status(&self) -> Result<RagStatus, ServiceError>;

    /// Ask a question against the index.
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ServiceError>;
}
