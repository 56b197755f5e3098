//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP, retry and rate-limit settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Keyword search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Inclusion/exclusion rules
    #[serde(default)]
    pub filter: FilterConfig,

    /// Worker pool and result cap
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Export destination and format
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url)?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 || self.api.connect_timeout_secs == 0 {
            return Err(AppError::validation("api timeouts must be > 0"));
        }
        if self.api.max_attempts == 0 {
            return Err(AppError::validation("api.max_attempts must be > 0"));
        }
        if self.api.max_concurrent == 0 {
            return Err(AppError::validation("api.max_concurrent must be > 0"));
        }
        if self.search.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(AppError::validation("No keywords defined"));
        }
        if self.search.max_pages == 0 {
            return Err(AppError::validation("search.max_pages must be > 0"));
        }
        if self.pipeline.workers == 0 {
            return Err(AppError::validation("pipeline.workers must be > 0"));
        }
        if self.pipeline.max_results == Some(0) {
            return Err(AppError::validation("pipeline.max_results must be > 0 when set"));
        }
        self.filter.validate()
    }
}

/// HTTP client, retry and rate-limit settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `https://www.googleapis.com/youtube/v3/`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Connect timeout in seconds
    #[serde(default = "defaults::connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Attempts per call, including the first
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Backoff base; delay before retry `n` is `base * 2^n + jitter`
    #[serde(default = "defaults::backoff_base")]
    pub backoff_base_ms: u64,

    /// Upper bound of the random jitter added to each backoff
    #[serde(default = "defaults::backoff_jitter")]
    pub backoff_jitter_ms: u64,

    /// Maximum requests in flight across all workers
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Minimum spacing between request starts in milliseconds
    #[serde(default)]
    pub request_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            connect_timeout_secs: defaults::connect_timeout(),
            timeout_secs: defaults::timeout(),
            max_attempts: defaults::max_attempts(),
            backoff_base_ms: defaults::backoff_base(),
            backoff_jitter_ms: defaults::backoff_jitter(),
            max_concurrent: defaults::max_concurrent(),
            request_delay_ms: 0,
        }
    }
}

/// Keyword search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Keywords searched with OR semantics
    #[serde(default = "defaults::keywords")]
    pub keywords: Vec<String>,

    /// Search pages (of 50) fetched per keyword
    #[serde(default = "defaults::max_pages")]
    pub max_pages: u32,

    /// `regionCode` hint
    #[serde(default = "defaults::region_code")]
    pub region_code: Option<String>,

    /// `relevanceLanguage` hint
    #[serde(default = "defaults::relevance_language")]
    pub relevance_language: Option<String>,

    /// Stop searching further keywords once this many unique ids are known
    #[serde(default)]
    pub max_candidates: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: defaults::keywords(),
            max_pages: defaults::max_pages(),
            region_code: defaults::region_code(),
            relevance_language: defaults::relevance_language(),
            max_candidates: None,
        }
    }
}

/// Subscriber range with explicit bound semantics.
///
/// A missing bound is unbounded. Each bound is inclusive unless its flag
/// says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberBounds {
    #[serde(default)]
    pub min: Option<u64>,

    #[serde(default = "defaults::enabled")]
    pub min_inclusive: bool,

    #[serde(default)]
    pub max: Option<u64>,

    #[serde(default = "defaults::enabled")]
    pub max_inclusive: bool,
}

impl Default for SubscriberBounds {
    fn default() -> Self {
        defaults::subscribers()
    }
}

/// Inclusion/exclusion rules, resolved into [`FilterCriteria`] at run start.
///
/// [`FilterCriteria`]: crate::models::FilterCriteria
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub subscribers: SubscriberBounds,

    /// Reject channels created before this instant
    #[serde(default)]
    pub created_after: Option<DateTime<Utc>>,

    /// Reject channels whose latest upload is before this instant
    #[serde(default)]
    pub latest_after: Option<DateTime<Utc>>,

    /// Reject channels with no upload in the last N days
    #[serde(default)]
    pub latest_within_days: Option<u32>,

    /// Case-insensitive regexes matched against title and description
    #[serde(default = "defaults::exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

impl FilterConfig {
    fn validate(&self) -> Result<()> {
        let bounds = &self.subscribers;
        if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
            if min > max {
                return Err(AppError::validation(format!(
                    "filter.subscribers.min ({min}) exceeds max ({max})"
                )));
            }
        }
        if self.latest_after.is_some() && self.latest_within_days.is_some() {
            return Err(AppError::validation(
                "filter.latest_after and filter.latest_within_days are mutually exclusive",
            ));
        }
        for pattern in &self.exclude_patterns {
            regex::Regex::new(pattern)?;
        }
        Ok(())
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            subscribers: SubscriberBounds::default(),
            created_after: None,
            latest_after: None,
            latest_within_days: None,
            exclude_patterns: defaults::exclude_patterns(),
        }
    }
}

/// Worker pool and result cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Concurrent detail batches / activity resolutions
    #[serde(default = "defaults::workers")]
    pub workers: usize,

    /// Keep only the first N rows of the ordered result
    #[serde(default)]
    pub max_results: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: defaults::workers(),
            max_results: None,
        }
    }
}

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Both,
}

impl ExportFormat {
    pub fn writes_csv(&self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Both)
    }

    pub fn writes_json(&self) -> bool {
        matches!(self, ExportFormat::Json | ExportFormat::Both)
    }
}

/// Export destination and format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "defaults::output_dir")]
    pub dir: PathBuf,

    /// File name prefix; a `_YYYYMMDD_HHMM` stamp is appended
    #[serde(default = "defaults::file_prefix")]
    pub file_prefix: String,

    #[serde(default = "defaults::format")]
    pub format: ExportFormat,

    /// Prepend a UTF-8 byte order mark to CSV output (for spreadsheet apps)
    #[serde(default = "defaults::enabled")]
    pub utf8_bom: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            file_prefix: defaults::file_prefix(),
            format: defaults::format(),
            utf8_bom: true,
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::{ExportFormat, SubscriberBounds};

    pub fn enabled() -> bool {
        true
    }

    // API defaults
    pub fn base_url() -> String {
        "https://www.googleapis.com/youtube/v3/".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; channel-scout/0.1)".into()
    }
    pub fn connect_timeout() -> u64 {
        5
    }
    pub fn timeout() -> u64 {
        40
    }
    pub fn max_attempts() -> u32 {
        4
    }
    pub fn backoff_base() -> u64 {
        1_000
    }
    pub fn backoff_jitter() -> u64 {
        500
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Search defaults
    pub fn keywords() -> Vec<String> {
        vec!["パイソン".into()]
    }
    pub fn max_pages() -> u32 {
        1
    }
    pub fn region_code() -> Option<String> {
        Some("JP".into())
    }
    pub fn relevance_language() -> Option<String> {
        Some("ja".into())
    }

    // Filter defaults
    pub fn subscribers() -> SubscriberBounds {
        SubscriberBounds {
            min: None,
            min_inclusive: true,
            max: Some(10_000),
            max_inclusive: false,
        }
    }
    pub fn exclude_patterns() -> Vec<String> {
        vec!["ボールパイソン".into(), "ball python".into()]
    }

    // Pipeline defaults
    pub fn workers() -> usize {
        4
    }

    // Output defaults
    pub fn output_dir() -> PathBuf {
        PathBuf::from(".")
    }
    pub fn file_prefix() -> String {
        "output_youtube_channels".into()
    }
    pub fn format() -> ExportFormat {
        ExportFormat::Csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_keywords() {
        let mut config = Config::default();
        config.search.keywords = vec!["  ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut config = Config::default();
        config.pipeline.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_result_cap() {
        let mut config = Config::default();
        config.pipeline.max_results = Some(0);
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));

        config.pipeline.max_results = Some(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_subscriber_range() {
        let mut config = Config::default();
        config.filter.subscribers.min = Some(500);
        config.filter.subscribers.max = Some(100);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_two_recency_thresholds() {
        let mut config = Config::default();
        config.filter.latest_within_days = Some(183);
        config.filter.latest_after = "2024-01-01T00:00:00Z".parse().ok();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_pattern() {
        let mut config = Config::default();
        config.filter.exclude_patterns = vec!["(unclosed".to_string()];
        assert!(matches!(config.validate(), Err(AppError::Pattern(_))));
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let toml = r#"
            [search]
            keywords = ["清掃", "掃除"]

            [filter]
            latest_after = "2025-01-01T00:00:00Z"
            exclude_patterns = ["NHK"]

            [filter.subscribers]
            min = 9000
            max = 300000
        "#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.search.keywords.len(), 2);
        assert_eq!(config.search.max_pages, 1);
        assert_eq!(config.filter.subscribers.min, Some(9_000));
        assert!(config.filter.subscribers.max_inclusive);
        assert_eq!(config.api.max_attempts, 4);
        assert_eq!(config.output.format, ExportFormat::Csv);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_reports_missing_file_and_falls_back() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("scout.toml");
        assert!(matches!(Config::load(&missing), Err(AppError::Config(_))));
        assert_eq!(Config::load_or_default(&missing).pipeline.workers, 4);

        std::fs::write(&missing, "[pipeline]\nworkers = 8\n").unwrap();
        assert_eq!(Config::load(&missing).unwrap().pipeline.workers, 8);
    }

    #[test]
    fn parses_bundled_example_config() {
        let config: Config = toml::from_str(include_str!("../../scout.example.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.filter.latest_within_days.is_some());
        assert!(config.filter.latest_after.is_none());
    }
}
