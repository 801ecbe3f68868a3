//! Error taxonomy for service calls and the RAG session.
//!
//! The `Display` text of each error is what the viewer puts into its error
//! slots, so messages are written for people, not for logs.

use thiserror::Error;

/// Failure of a call to the parsing or RAG service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// The request never completed (connection refused, timeout, ...).
    #[error("request failed: {0}")]
    Network(String),
    /// The service answered with a non-success status.
    ///
    /// `message` is the response body text when the body was non-empty,
    /// otherwise a generic "`<operation>` failed: `<status>`" line.
    #[error("{message}")]
    Service { status: u16, message: String },
    /// The service answered successfully but the body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Build a [`ServiceError::Service`] from a status and response body,
    /// falling back to `"<operation> failed: <status>"` for empty bodies.
    pub fn from_response(operation: &str, status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("{} failed: {}", operation, status)
        } else {
            body.to_string()
        };
        Self::Service { status, message }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "NETWORK_FAILURE",
            Self::Service { .. } => "SERVICE_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
        }
    }
}

/// Rejections raised by the RAG session itself, before any call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RagError {
    #[error("RAG index is not initialized; initialize it before asking questions")]
    NotInitialized,
}
