//! # Parse Viewer
//!
//! A viewer and RAG session client for document-parsing results.
//!
//! A parsing backend turns an uploaded PDF or image into pages of detected
//! blocks (paragraphs, headings, tables, figures, formulas) with bounding
//! boxes. Parse Viewer keeps the pages, the cross-view selection, and the
//! RAG session in one place and renders every view from that single state.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  HTTP   ┌──────────────┐
//! │ parse / RAG  │◀───────▶│  HttpClient  │
//! │   backend    │         └──────┬───────┘
//! └──────────────┘                │ ParseService + RagService
//!                                 ▼
//!                          ┌──────────────┐   views   ┌──────────┐
//!                          │  ViewerApp   │──────────▶│  report  │
//!                          │ (core state) │           │  (pview) │
//!                          └──────────────┘           └──────────┘
//! ```
//!
//! The state model (geometry, identity, pages, selection, RAG session,
//! view contracts) lives in the WASM-safe `parse-viewer-core` crate.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`client`] | reqwest implementation of the service traits |
//! | [`app`] | `ViewerApp`, the coordinating context |
//! | [`progress`] | Upload and RAG progress on stderr |
//! | [`report`] | Text and JSON rendering for the CLI |
//! | [`commands`] | `pview` command implementations |

pub mod app;
pub mod client;
pub mod commands;
pub mod config;
pub mod progress;
pub mod report;
