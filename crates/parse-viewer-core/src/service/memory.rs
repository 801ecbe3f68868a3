//! In-memory [`ParseService`] + [`RagService`] for testing and offline demos.
//!
//! Responses are scripted up front. The RAG side mimics the backend's
//! rules: queries before initialization fail with a 400, and the index
//! reports a fixed chunk count once initialized. Every request is recorded
//! so tests can assert on what the session sent.

use std::sync::RwLock;

use async_trait::async_trait;

use super::{ParseService, RagService};
use crate::error::ServiceError;
use crate::models::{
    HealthStatus, InitRequest, ProcessResponse, QueryRequest, QueryResponse, RagStatus, Upload,
};

struct RagState {
    status: RagStatus,
    chunks_on_init: u64,
    init_failure: Option<ServiceError>,
    status_failure: Option<ServiceError>,
    query_failure: Option<ServiceError>,
    answer: QueryResponse,
}

/// Scripted in-memory backend.
pub struct InMemoryService {
    process: RwLock<Result<ProcessResponse, ServiceError>>,
    health: RwLock<HealthStatus>,
    rag: RwLock<RagState>,
    uploads: RwLock<Vec<String>>,
    queries: RwLock<Vec<QueryRequest>>,
    inits: RwLock<Vec<InitRequest>>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self {
            process: RwLock::new(Ok(ProcessResponse::default())),
            health: RwLock::new(HealthStatus::with_status("ok")),
            rag: RwLock::new(RagState {
                status: RagStatus::not_initialized(),
                chunks_on_init: 0,
                init_failure: None,
                status_failure: None,
                query_failure: None,
                answer: QueryResponse::default(),
            }),
            uploads: RwLock::new(Vec::new()),
            queries: RwLock::new(Vec::new()),
            inits: RwLock::new(Vec::new()),
        }
    }

    /// Script the response of the next uploads.
    pub fn set_process_result(&self, result: Result<ProcessResponse, ServiceError>) {
        *write(&self.process) = result;
    }

    pub fn set_health(&self, health: HealthStatus) {
        *write(&self.health) = health;
    }

    /// Chunk count reported after a successful initialize.
    pub fn set_chunks_on_init(&self, chunks: u64) {
        write(&self.rag).chunks_on_init = chunks;
    }

    /// Mark the index as already built, as if another client initialized it.
    pub fn set_initialized(&self, chunks: u64) {
        let mut rag = write(&self.rag);
        rag.status.initialized = true;
        rag.status.chunks_indexed = chunks;
    }

    pub fn fail_init(&self, error: Option<ServiceError>) {
        write(&self.rag).init_failure = error;
    }

    pub fn fail_status(&self, error: Option<ServiceError>) {
        write(&self.rag).status_failure = error;
    }

    pub fn fail_queries(&self, error: Option<ServiceError>) {
        write(&self.rag).query_failure = error;
    }

    pub fn set_answer(&self, answer: QueryResponse) {
        write(&self.rag).answer = answer;
    }

    /// File names of all uploads received, in order.
    pub fn uploads(&self) -> Vec<String> {
        read(&self.uploads).clone()
    }

    /// All query requests received, in order.
    pub fn queries(&self) -> Vec<QueryRequest> {
        read(&self.queries).clone()
    }

    pub fn init_requests(&self) -> usize {
        read(&self.inits).len()
    }
}

impl Default for InMemoryService {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl ParseService for InMemoryService {
    async fn process(&self, upload: &Upload) -> Result<ProcessResponse, ServiceError> {
        write(&self.uploads).push(upload.file_name.clone());
        read(&self.process).clone()
    }

    async fn health(&self) -> HealthStatus {
        read(&self.health).clone()
    }
}

#[async_trait]
impl RagService for InMemoryService {
    async fn initialize(&self, request: &InitRequest) -> Result<RagStatus, ServiceError> {
        write(&self.inits).push(request.clone());
        let mut rag = write(&self.rag);
        if let Some(err) = rag.init_failure.clone() {
            rag.status = RagStatus::not_initialized();
            return Err(err);
        }
        rag.status = RagStatus {
            initialized: true,
            chunks_indexed: rag.chunks_on_init,
            recognition_dir: request.recognition_dir.clone(),
        };
        Ok(rag.status.clone())
    }

    async fn status(&self) -> Result<RagStatus, ServiceError> {
        let rag = read(&self.rag);
        match &rag.status_failure {
            Some(err) => Err(err.clone()),
            None => Ok(rag.status.clone()),
        }
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ServiceError> {
        write(&self.queries).push(request.clone());
        let rag = read(&self.rag);
        if !rag.status.initialized {
            return Err(ServiceError::from_response(
                "RAG query",
                400,
                "RAG service is not initialized. Call /rag/init first.",
            ));
        }
        match &rag.query_failure {
            Some(err) => Err(err.clone()),
            None => Ok(rag.answer.clone()),
        }
    }
}
