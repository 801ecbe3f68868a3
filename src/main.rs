//! # Parse Viewer CLI (`pview`)
//!
//! Drives a document-parsing backend and its RAG service from the terminal:
//! upload a document, inspect the parsed blocks of a page, and ask questions
//! over the parsed corpus.
//!
//! ## Usage
//!
//! ```bash
//! pview [--config ./pview.toml] [--progress off|human|json] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pview health` | Print the backend health status |
//! | `pview process <file>` | Upload a file and print a page's blocks |
//! | `pview rag init` | Build the RAG index over the parsed outputs |
//! | `pview rag status` | Print whether the index is ready |
//! | `pview ask "<question>"` | Ask a question and print the answer with sources |
//!
//! ## Examples
//!
//! ```bash
//! # Second page of a PDF, laid out at 1024 px
//! pview process report.pdf --page 2 --display-width 1024
//!
//! # Reading order as markdown, blocks sorted by position on the page
//! pview process scan.png --format markdown --layout-order
//!
//! # Build the index, then ask
//! pview rag init
//! pview ask "what is the total?" -k 5
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default `warn`).

use clap::{Parser, Subcommand};
use parse_viewer::commands::{self, OutputFormat};
use parse_viewer::config;
use parse_viewer::progress::ProgressMode;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Parse Viewer CLI: inspect document-parsing results and query them.
#[derive(Parser)]
#[command(
    name = "pview",
    about = "Parse Viewer: inspect document-parsing results and ask questions over them",
    version
)]
struct Cli {
    /// Path to a configuration file (TOML). Defaults apply without one.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Progress on stderr. Defaults to `human` on a terminal, else `off`.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the parsing backend is up.
    Health,

    /// Upload a PDF or image and show the parsed blocks of one page.
    Process {
        /// File to upload.
        file: PathBuf,

        /// 1-based page to show.
        #[arg(long)]
        page: Option<usize>,

        /// Width in pixels the overlay image is laid out at.
        #[arg(long)]
        display_width: Option<u32>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// List blocks by position on the page (markdown format only).
        #[arg(long)]
        layout_order: bool,
    },

    /// Manage the RAG index.
    Rag {
        #[command(subcommand)]
        action: RagAction,
    },

    /// Ask a question over the indexed corpus.
    Ask {
        question: String,

        /// Number of passages to retrieve.
        #[arg(short)]
        k: Option<u32>,
    },
}

#[derive(Subcommand)]
enum RagAction {
    /// Build (or rebuild) the index.
    Init {
        /// Recognition output directory to index instead of the latest one.
        #[arg(long)]
        recognition_dir: Option<String>,
    },
    /// Show whether the index is ready.
    Status,
}

/// `RUST_LOG` when set and valid, otherwise `warn`.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;
    let progress = cli
        .progress
        .unwrap_or_else(ProgressMode::default_for_tty)
        .reporter();

    match cli.command {
        Commands::Health => {
            commands::run_health(&cfg).await?;
        }
        Commands::Process {
            file,
            page,
            display_width,
            format,
            layout_order,
        } => {
            commands::run_process(
                &cfg,
                &file,
                page,
                display_width,
                format,
                layout_order,
                progress,
            )
            .await?;
        }
        Commands::Rag { action } => match action {
            RagAction::Init { recognition_dir } => {
                commands::run_rag_init(&cfg, recognition_dir, progress).await?;
            }
            RagAction::Status => {
                commands::run_rag_status(&cfg).await?;
            }
        },
        Commands::Ask { question, k } => {
            commands::run_ask(&cfg, &question, k, progress).await?;
        }
    }

    Ok(())
}
