//! # Parse Viewer Core
//!
//! Shared, WASM-safe logic for Parse Viewer: the coordinate mapper, item
//! identity, page and selection models, the RAG session state machine, and
//! the contracts of the synchronized views.
//!
//! This crate contains no tokio, reqwest, filesystem I/O, or other
//! native-only dependencies. Services are reached through the async traits
//! in [`service`]; the `parse-viewer` app crate provides the HTTP
//! implementation.

pub mod error;
pub mod geometry;
pub mod identity;
pub mod models;
pub mod pages;
pub mod rag;
pub mod selection;
pub mod service;
pub mod view;
pub mod views;
