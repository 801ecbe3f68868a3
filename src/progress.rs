//! Upload and RAG progress reporting.
//!
//! Long calls (uploading a PDF, building the index, answering a question)
//! report what they are doing so users are not left staring at a silent
//! terminal. Progress is emitted on **stderr** so stdout remains parseable
//! for scripts.

use std::io::Write;

/// A single progress event.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    /// A file is being sent to the parsing service.
    Uploading { file: String, bytes: u64 },
    /// The parsing service answered with this many pages.
    Processed { file: String, pages: usize },
    /// A RAG index build was requested.
    Indexing,
    /// The index build finished.
    Indexed { chunks: u64 },
    /// A question was sent to the RAG service.
    Querying { k: u32 },
}

/// Reports progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "upload report.pdf  1,234,567 bytes".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Uploading { file, bytes } => {
                format!("upload {}  {} bytes\n", file, format_number(*bytes))
            }
            ProgressEvent::Processed { file, pages } => {
                format!("upload {}  processed  {} page(s)\n", file, pages)
            }
            ProgressEvent::Indexing => "rag  indexing...\n".to_string(),
            ProgressEvent::Indexed { chunks } => {
                format!("rag  indexed  {} chunks\n", format_number(*chunks))
            }
            ProgressEvent::Querying { k } => format!("rag  querying (k={})...\n", k),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Uploading { file, bytes } => serde_json::json!({
                "event": "progress",
                "phase": "uploading",
                "file": file,
                "bytes": bytes
            }),
            ProgressEvent::Processed { file, pages } => serde_json::json!({
                "event": "progress",
                "phase": "processed",
                "file": file,
                "pages": pages
            }),
            ProgressEvent::Indexing => serde_json::json!({
                "event": "progress",
                "phase": "indexing"
            }),
            ProgressEvent::Indexed { chunks } => serde_json::json!({
                "event": "progress",
                "phase": "indexed",
                "chunks": chunks
            }),
            ProgressEvent::Querying { k } => serde_json::json!({
                "event": "progress",
                "phase": "querying",
                "k": k
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }
}
