//! `pview` command implementations.
//!
//! Each `run_*` function loads what it needs, talks to the backend through
//! [`HttpClient`], and prints its result on stdout. Progress goes to stderr.

use anyhow::{Context, Result};
use chrono::Utc;
use parse_viewer_core::geometry::ImageMetrics;
use parse_viewer_core::models::Upload;
use parse_viewer_core::rag::QueryOutcome;
use parse_viewer_core::service::{ParseService, RagService};
use std::path::Path;

use crate::app::ViewerApp;
use crate::client::HttpClient;
use crate::config::Config;
use crate::progress::ProgressReporter;
use crate::report;

/// Output format of `pview process`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

pub async fn run_health(cfg: &Config) -> Result<()> {
    let client = HttpClient::new(&cfg.service)?;
    let health = client.health().await;
    println!("{}", report::format_health(&health));
    Ok(())
}

pub async fn run_process(
    cfg: &Config,
    file: &Path,
    page: Option<usize>,
    display_width: Option<u32>,
    format: OutputFormat,
    layout_order: bool,
    progress: Box<dyn ProgressReporter>,
) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let client = HttpClient::new(&cfg.service)?;
    let mut app = ViewerApp::new(client.clone(), cfg).with_progress(progress);
    let page_count = app
        .upload(Upload::new(file_name.clone(), bytes))
        .await
        .with_context(|| format!("Failed to process {}", file_name))?;

    if page_count == 0 {
        println!("{}: no pages", file_name);
        return Ok(());
    }
    if let Some(n) = page {
        if n == 0 || !app.navigate(n - 1) {
            anyhow::bail!("page {} is out of range (document has {} pages)", n, page_count);
        }
    }

    if format == OutputFormat::Markdown {
        let reading_order = if layout_order {
            app.layout_reading_order_markdown(cfg.viewer.line_tolerance)
        } else {
            app.reading_order_markdown()
        };
        println!("{}", reading_order);
        println!();
        println!("## Extracted Content");
        println!();
        println!("{}", app.extracted_markdown());
        return Ok(());
    }

    let Some(overlay_ref) = app.current_page().map(|p| p.overlay_image_ref.clone()) else {
        anyhow::bail!("no active page");
    };
    let width = f64::from(display_width.unwrap_or(cfg.viewer.display_width));
    let metrics = if overlay_ref.is_empty() {
        ImageMetrics::unloaded()
    } else {
        match client.fetch_image_metrics(&overlay_ref, width).await {
            Ok(metrics) => metrics,
            Err(e) => {
                tracing::warn!(error = %e, "could not read overlay image size; boxes are unplaced");
                app.mark_overlay_failed();
                ImageMetrics::unloaded()
            }
        }
    };
    let Some(current) = app.current_page() else {
        anyhow::bail!("no active page");
    };
    let Some(layout) = app.overview(&metrics, Utc::now()) else {
        anyhow::bail!("no active page");
    };

    match format {
        OutputFormat::Json => {
            let value = report::page_json(
                app.view().pages().active_index(),
                page_count,
                current,
                &layout,
            );
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        _ => {
            let header = app.document_view().header.unwrap_or_else(|| {
                format!(
                    "Page {} of {}",
                    app.view().pages().active_index() + 1,
                    page_count
                )
            });
            let overlay_view = app.page_overlay_view();
            let overlay = match (&overlay_view.image, overlay_view.empty) {
                (Some(path), _) => client.resolve_asset(path),
                (None, Some(empty)) => empty.message().to_string(),
                (None, None) => String::new(),
            };
            let source = current
                .source_image_ref
                .as_deref()
                .map(|s| client.resolve_asset(s));
            println!(
                "{}",
                report::format_page_text(
                    &file_name,
                    page_count,
                    &header,
                    current,
                    (&overlay, source.as_deref()),
                    &layout,
                )
            );
        }
    }
    Ok(())
}

pub async fn run_rag_init(
    cfg: &Config,
    recognition_dir: Option<String>,
    progress: Box<dyn ProgressReporter>,
) -> Result<()> {
    let mut cfg = cfg.clone();
    if recognition_dir.is_some() {
        cfg.rag.recognition_dir = recognition_dir;
    }
    let client = HttpClient::new(&cfg.service)?;
    let mut app = ViewerApp::new(client, &cfg).with_progress(progress);
    app.initialize_rag().await;
    if let Some(err) = app.rag().last_error() {
        anyhow::bail!("RAG init failed: {}", err);
    }
    println!("{}", app.rag().status_label());
    if let Some(dir) = app.rag().recognition_dir() {
        println!("recognition_dir: {}", dir);
    }
    Ok(())
}

pub async fn run_rag_status(cfg: &Config) -> Result<()> {
    let client = HttpClient::new(&cfg.service)?;
    let status = client.status().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "rag status check failed");
        Default::default()
    });
    println!("{}", report::format_rag_status(&status));
    Ok(())
}

pub async fn run_ask(
    cfg: &Config,
    question: &str,
    k: Option<u32>,
    progress: Box<dyn ProgressReporter>,
) -> Result<()> {
    let client = HttpClient::new(&cfg.service)?;
    let mut app = ViewerApp::new(client, cfg).with_progress(progress);
    app.refresh_rag_status().await;

    let k = k.unwrap_or(cfg.rag.default_k);
    if k == 0 {
        anyhow::bail!("k must be >= 1");
    }
    match app.ask_with_k(question, k).await? {
        QueryOutcome::Skipped => {
            tracing::debug!("empty question, nothing asked");
            return Ok(());
        }
        QueryOutcome::Completed(_) => {}
    }
    if let Some(err) = app.rag().last_error() {
        anyhow::bail!("RAG query failed: {}", err);
    }
    println!("{}", report::format_answer(app.rag(), &app.source_cards()));
    Ok(())
}
