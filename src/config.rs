//! Configuration parsing and validation.
//!
//! `pview` reads an optional TOML file. Every section and field has a
//! default, so an empty file (or no file at all) gives a working setup
//! against a backend on `http://127.0.0.1:8000`.
//!
//! ```toml
//! [service]
//! base_url = "http://127.0.0.1:8000"
//! timeout_secs = 120
//!
//! [rag]
//! default_k = 3
//! require_initialized = true
//! # recognition_dir = "api_outputs/run-1/recognition_json"
//! # include_relations = true
//! # relation_window = 2
//! # max_group_items = 6
//!
//! [viewer]
//! display_width = 800
//! copy_feedback_ms = 2000
//! line_tolerance = 20.0
//! ```
//!
//! The `PVIEW_API_BASE` environment variable overrides `service.base_url`.

use anyhow::{Context, Result};
use parse_viewer_core::models::QueryOptions;
use parse_viewer_core::views::reading_order::DEFAULT_Y_TOLERANCE;
use serde::Deserialize;
use std::path::Path;

/// Environment variable that overrides `service.base_url`.
pub const API_BASE_ENV: &str = "PVIEW_API_BASE";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub rag: RagConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Uploads of long PDFs are slow, hence the
    /// generous default.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct RagConfig {
    #[serde(default = "default_k")]
    pub default_k: u32,
    /// Reject questions locally while the index is not initialized.
    #[serde(default = "default_require_initialized")]
    pub require_initialized: bool,
    #[serde(default)]
    pub recognition_dir: Option<String>,
    #[serde(default)]
    pub include_relations: Option<bool>,
    #[serde(default)]
    pub relation_window: Option<u32>,
    #[serde(default)]
    pub max_group_items: Option<u32>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            require_initialized: default_require_initialized(),
            recognition_dir: None,
            include_relations: None,
            relation_window: None,
            max_group_items: None,
        }
    }
}

impl RagConfig {
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            include_relations: self.include_relations,
            relation_window: self.relation_window,
            max_group_items: self.max_group_items,
        }
    }
}

fn default_k() -> u32 {
    3
}
fn default_require_initialized() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewerConfig {
    /// Width the overview image is laid out at, in pixels.
    #[serde(default = "default_display_width")]
    pub display_width: u32,
    #[serde(default = "default_copy_feedback_ms")]
    pub copy_feedback_ms: u64,
    /// Source pixels within which blocks count as one line when the
    /// reading order follows the page layout.
    #[serde(default = "default_line_tolerance")]
    pub line_tolerance: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            display_width: default_display_width(),
            copy_feedback_ms: default_copy_feedback_ms(),
            line_tolerance: default_line_tolerance(),
        }
    }
}

fn default_display_width() -> u32 {
    800
}
fn default_copy_feedback_ms() -> u64 {
    2000
}
fn default_line_tolerance() -> f64 {
    DEFAULT_Y_TOLERANCE
}

/// Load and validate the config at `path`, or the defaults when `None`.
/// `PVIEW_API_BASE` is applied before validation.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse config file")?
        }
        None => Config::default(),
    };

    if let Ok(base) = std::env::var(API_BASE_ENV) {
        if !base.trim().is_empty() {
            config.service.base_url = base.trim().to_string();
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let base = &config.service.base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        anyhow::bail!(
            "service.base_url must start with http:// or https:// (got '{}')",
            base
        );
    }

    if config.service.timeout_secs == 0 {
        anyhow::bail!("service.timeout_secs must be > 0");
    }

    if config.rag.default_k < 1 {
        anyhow::bail!("rag.default_k must be >= 1");
    }

    if config.viewer.display_width == 0 {
        anyhow::bail!("viewer.display_width must be > 0");
    }

    let tolerance = config.viewer.line_tolerance;
    if !tolerance.is_finite() || tolerance < 0.0 {
        anyhow::bail!("viewer.line_tolerance must be a non-negative number");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.service.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.service.timeout_secs, 120);
        assert_eq!(config.rag.default_k, 3);
        assert!(config.rag.require_initialized);
        assert_eq!(config.viewer.display_width, 800);
        assert_eq!(config.viewer.copy_feedback_ms, 2000);
        assert_eq!(config.viewer.line_tolerance, 20.0);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
[service]
base_url = "https://parser.internal:9000"

[rag]
include_relations = true
relation_window = 2
"#,
        )
        .unwrap();
        assert_eq!(config.service.timeout_secs, 120);
        let opts = config.rag.query_options();
        assert_eq!(opts.include_relations, Some(true));
        assert_eq!(opts.relation_window, Some(2));
        assert_eq!(opts.max_group_items, None);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.service.base_url = "127.0.0.1:8000".into();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.service.timeout_secs = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.rag.default_k = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.viewer.display_width = 0;
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.viewer.line_tolerance = -1.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pview.toml");
        std::fs::write(&path, "[rag]\ndefault_k = 5\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.rag.default_k, 5);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/pview.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
