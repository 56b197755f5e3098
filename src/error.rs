// src/error.rs

//! Unified error handling for the scout application.
//!
//! Two layers live here. [`ApiError`] is a single failed upstream call,
//! returned by value from the transport so that every stage treats it as
//! data. [`AppError`] is what actually aborts a run.

use std::fmt;

use thiserror::Error;

/// Result type alias for scout operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Maximum number of response body characters kept in an [`ApiError`].
pub const BODY_EXCERPT_LIMIT: usize = 500;

/// Upstream reason codes that mean every further call will fail too.
const FATAL_REASONS: &[&str] = &[
    "keyInvalid",
    "keyExpired",
    "quotaExceeded",
    "dailyLimitExceeded",
    "accessNotConfigured",
];

/// A failed call to the platform API, after retries were exhausted.
///
/// The `url` never contains the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Last HTTP status seen, if any response arrived at all
    pub status: Option<u16>,

    /// Request URL with the credential stripped
    pub url: String,

    /// First characters of the last response body
    pub body_excerpt: Option<String>,

    /// Last network-level or decode error
    pub exception: Option<String>,

    /// Upstream `error.errors[0].reason` code, when the body carried one
    pub reason: Option<String>,

    /// Number of attempts made
    pub attempts: u32,
}

impl ApiError {
    /// Create an error for a request URL with no other details yet.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            status: None,
            url: url.into(),
            body_excerpt: None,
            exception: None,
            reason: None,
            attempts: 0,
        }
    }

    /// Error for a response that arrived but failed to decode.
    pub fn decode(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            exception: Some(format!("decode: {message}")),
            attempts: 1,
            ..Self::new(url)
        }
    }

    /// Error for a call refused because the run has been aborted.
    pub fn aborted(url: impl Into<String>) -> Self {
        Self {
            exception: Some("run aborted".to_string()),
            ..Self::new(url)
        }
    }

    /// Record a response status and body.
    pub fn with_response(mut self, status: u16, body: &str) -> Self {
        self.status = Some(status);
        self.reason = extract_reason(body);
        self.body_excerpt = Some(excerpt(body));
        self
    }

    /// Record a network-level failure.
    pub fn with_exception(mut self, message: impl fmt::Display) -> Self {
        self.exception = Some(message.to_string());
        self
    }

    /// HTTP 404.
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// Credential or quota rejection: no further call can succeed this run.
    pub fn is_fatal(&self) -> bool {
        self.status == Some(401)
            || self
                .reason
                .as_deref()
                .is_some_and(|reason| FATAL_REASONS.contains(&reason))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {status} from {}", self.url)?,
            None => write!(f, "request to {} failed", self.url)?,
        }
        if let Some(reason) = &self.reason {
            write!(f, " (reason: {reason})")?;
        }
        if let Some(exception) = &self.exception {
            write!(f, ": {exception}")?;
        }
        if self.attempts > 1 {
            write!(f, " after {} attempts", self.attempts)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LIMIT).collect()
}

/// Pull `error.errors[0].reason` out of a Google-style error body.
fn extract_reason(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/errors/0/reason")
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Exclusion pattern failed to compile
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// No API key was supplied
    #[error("API key is missing; set YOUTUBE_API_KEY or pass --api-key")]
    MissingCredential,

    /// The pre-run probe failed
    #[error("Sanity check failed: {0}")]
    SanityCheck(ApiError),

    /// Credential or quota rejected mid-run
    #[error("Run aborted: {0}")]
    Fatal(ApiError),

    /// Writing results failed
    #[error("Export error for {target}: {message}")]
    Export { target: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an export error with context.
    pub fn export(target: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Export {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::SanityCheck(_) => 2,
            AppError::Fatal(_) => 3,
            _ => 1,
        }
    }
}
