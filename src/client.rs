//! HTTP client for the parsing and RAG backends.
//!
//! [`HttpClient`] implements both [`ParseService`] and [`RagService`] over
//! `reqwest`. Non-success responses become [`ServiceError::Service`] with
//! the response body as the message (or `"<operation> failed: <status>"`
//! when the body is empty). Health checks never fail: any problem reads as
//! `{status: "error"}`.
//!
//! | Endpoint | Method |
//! |----------|--------|
//! | `POST /api/process` (multipart `file`) | [`ParseService::process`] |
//! | `GET /api/health` | [`ParseService::health`] |
//! | `POST /rag/init` | [`RagService::initialize`] |
//! | `GET /rag/status` | [`RagService::status`] |
//! | `POST /rag/query` | [`RagService::query`] |

use anyhow::{Context, Result};
use async_trait::async_trait;
use parse_viewer_core::error::ServiceError;
use parse_viewer_core::geometry::ImageMetrics;
use parse_viewer_core::models::{
    HealthStatus, InitRequest, ProcessResponse, QueryRequest, QueryResponse, RagStatus, Upload,
};
use parse_viewer_core::service::{ParseService, RagService};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ServiceConfig;

/// reqwest-backed client for one backend base URL.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a server-relative asset path (`/outputs/p1.png`) against the
    /// base URL. Absolute URLs are returned unchanged.
    pub fn resolve_asset(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Download the image at `path` and read its natural size, laid out at
    /// `display_width` with the aspect ratio preserved.
    pub async fn fetch_image_metrics(&self, path: &str, display_width: f64) -> Result<ImageMetrics> {
        let url = self.resolve_asset(path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch image {}", url))?;
        if !resp.status().is_success() {
            anyhow::bail!("Image {} returned {}", url, resp.status());
        }
        let bytes = resp.bytes().await?;
        let size = imagesize::blob_size(&bytes)
            .map_err(|e| anyhow::anyhow!("Unrecognized image at {}: {:?}", url, e))?;
        Ok(ImageMetrics::fit_width(
            size.width as f64,
            size.height as f64,
            display_width,
        ))
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

fn network(err: reqwest::Error) -> ServiceError {
    ServiceError::Network(err.to_string())
}

/// Turn a response into `T`, mapping non-success statuses to
/// [`ServiceError::Service`].
async fn decode<T: DeserializeOwned>(
    operation: &str,
    resp: reqwest::Response,
) -> std::result::Result<T, ServiceError> {
    let status = resp.status();
    let body = resp.text().await.map_err(network)?;
    if !status.is_success() {
        return Err(ServiceError::from_response(operation, status.as_u16(), &body));
    }
    serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))
}

#[async_trait]
impl ParseService for HttpClient {
    async fn process(&self, upload: &Upload) -> std::result::Result<ProcessResponse, ServiceError> {
        tracing::debug!(file = %upload.file_name, bytes = upload.bytes.len(), "uploading");
        let part = reqwest::multipart::Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone());
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self
            .client
            .post(self.url("/api/process"))
            .multipart(form)
            .send()
            .await
            .map_err(network)?;
        decode("Upload", resp).await
    }

    async fn health(&self) -> HealthStatus {
        let resp = match self.client.get(self.url("/api/health")).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "health check failed");
                return HealthStatus::error();
            }
            Err(e) => {
                tracing::warn!(error = %e, "health check failed");
                return HealthStatus::error();
            }
        };
        resp.json().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "health check returned an unreadable body");
            HealthStatus::error()
        })
    }
}

#[async_trait]
impl RagService for HttpClient {
    async fn initialize(&self, request: &InitRequest) -> std::result::Result<RagStatus, ServiceError> {
        let resp = self
            .client
            .post(self.url("/rag/init"))
            .json(request)
            .send()
            .await
            .map_err(network)?;
        decode("RAG init", resp).await
    }

    async fn status(&self) -> std::result::Result<RagStatus, ServiceError> {
        let resp = self
            .client
            .get(self.url("/rag/status"))
            .send()
            .await
            .map_err(network)?;
        decode("RAG status", resp).await
    }

    async fn query(&self, request: &QueryRequest) -> std::result::Result<QueryResponse, ServiceError> {
        let resp = self
            .client
            .post(self.url("/rag/query"))
            .json(request)
            .send()
            .await
            .map_err(network)?;
        decode("RAG query", resp).await
    }
}
