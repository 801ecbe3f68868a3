//! Mock parsing + RAG backend shared by the integration tests.
//!
//! Mirrors the real backend's routes and error bodies closely enough for
//! the client and CLI to be exercised end to end.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const OVERLAY_WIDTH: u32 = 1000;
pub const OVERLAY_HEIGHT: u32 = 1400;

#[derive(Default)]
pub struct MockState {
    pub initialized: AtomicBool,
    pub chunks: AtomicU64,
    pub status_broken: AtomicBool,
    pub uploads: Mutex<Vec<String>>,
    pub queries: Mutex<Vec<Value>>,
}

pub struct Backend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

pub fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub async fn wait_for_server(base_url: &str) {
    let client = reqwest::Client::new();
    let url = format!("{}/api/health", base_url);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Mock backend did not become ready within 5 seconds");
}

/// Start the mock backend on a free port and wait until it answers.
pub async fn spawn_backend() -> Backend {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/process", post(process))
        .route("/static/{name}", get(static_image))
        .route("/rag/init", post(rag_init))
        .route("/rag/status", get(rag_status))
        .route("/rag/query", post(rag_query))
        .with_state(state.clone());

    let port = find_free_port();
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let base_url = format!("http://127.0.0.1:{}", port);
    wait_for_server(&base_url).await;
    Backend { base_url, state }
}

/// Smallest PNG header `imagesize` can read dimensions from.
pub fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "model": "mock-layout"}))
}

fn uploaded_file_name(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let start = text.find("filename=\"")? + "filename=\"".len();
    let end = text[start..].find('"')?;
    Some(text[start..start + end].to_string())
}

async fn process(State(state): State<Arc<MockState>>, body: Bytes) -> Response {
    let Some(name) = uploaded_file_name(&body) else {
        return (StatusCode::BAD_REQUEST, "missing file part").into_response();
    };
    state.uploads.lock().unwrap().push(name.clone());

    if name.starts_with("broken") {
        return (StatusCode::UNPROCESSABLE_ENTITY, "Unsupported file").into_response();
    }
    if name.starts_with("empty") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "").into_response();
    }
    if name.starts_with("odd") {
        return Json(json!({"type": "spreadsheet", "sheets": []})).into_response();
    }
    if name.starts_with("columns") {
        return Json(json!({
            "type": "image",
            "items": [
                {"type": "paragraph", "bbox": [500, 100, 900, 400], "text": "Right column", "order": 1},
                {"type": "paragraph", "bbox": [50, 110, 450, 400], "text": "Left column", "order": 2}
            ],
            "overlay_url": "/static/overlay.png"
        }))
        .into_response();
    }
    if name.ends_with(".png") {
        return Json(json!({
            "type": "image",
            "items": [
                {"id": 1, "type": "heading", "bbox": [50, 40, 950, 120], "text": "Invoice", "order": 1},
                {"id": 2, "type": "table", "bbox": [50, 200, 950, 900], "order": 2}
            ],
            "overlay_url": "/static/overlay.png",
            "original_url": null
        }))
        .into_response();
    }
    Json(json!({
        "type": "pdf",
        "pages": [
            {
                "page": 1,
                "items": [
                    {"type": "heading", "bbox": [100, 100, 600, 200], "text": "Quarterly Report", "order": 1},
                    {"type": "paragraph", "bbox": [100, 250, 900, 500], "text": "Revenue grew.", "order": 2},
                    {"type": "footer", "text": "page 1"}
                ],
                "overlay_url": "/static/overlay.png",
                "original_url": "/static/page1.png"
            },
            {
                "page": 2,
                "items": [
                    {"type": "table", "bbox": [0, 0, 1000, 700], "text": "Total | 42"}
                ],
                "overlay_url": "/static/overlay.png",
                "original_url": "/static/page2.png"
            }
        ]
    }))
    .into_response()
}

async fn static_image() -> Response {
    (
        [("content-type", "image/png")],
        png_header(OVERLAY_WIDTH, OVERLAY_HEIGHT),
    )
        .into_response()
}

async fn rag_init(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let dir = body.get("recognition_dir").and_then(|d| d.as_str());
    if dir == Some("missing") {
        state.initialized.store(false, Ordering::SeqCst);
        return (
            StatusCode::NOT_FOUND,
            "No recognition_json directory found under api_outputs",
        )
            .into_response();
    }
    state.initialized.store(true, Ordering::SeqCst);
    state.chunks.store(17, Ordering::SeqCst);
    Json(json!({
        "initialized": true,
        "chunks_indexed": 17,
        "recognition_dir": dir.unwrap_or("api_outputs/latest/recognition_json")
    }))
    .into_response()
}

async fn rag_status(State(state): State<Arc<MockState>>) -> Response {
    if state.status_broken.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "").into_response();
    }
    Json(json!({
        "initialized": state.initialized.load(Ordering::SeqCst),
        "chunks_indexed": state.chunks.load(Ordering::SeqCst)
    }))
    .into_response()
}

async fn rag_query(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.queries.lock().unwrap().push(body);
    if !state.initialized.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            r#"{"detail":"RAG service is not initialized. Call /rag/init first."}"#,
        )
            .into_response();
    }
    Json(json!({
        "answer": "42",
        "sources": [
            {"page": 2, "line": 5, "text": "Total | 42", "score": 0.91, "percentage": 91,
             "related": [{"page": 2, "line": 6, "score": 0.4, "text": "Net | 40"}]}
        ]
    }))
    .into_response()
}
