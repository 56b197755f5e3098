//! HTTP transport with retry and backoff.
//!
//! A [`Transport`] issues one logical GET and reports the outcome as a value:
//! either the decoded JSON body or an [`ApiError`]. Nothing is raised past
//! this boundary.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use url::Url;

use crate::error::{ApiError, Result};
use crate::models::ApiConfig;
use crate::utils::http::create_client;

use super::gate::RateGate;
use super::retry::RetryPolicy;

/// Query parameters for one call, credential excluded.
pub type Params<'a> = [(&'a str, String)];

/// Name of the credential query parameter.
const KEY_PARAM: &str = "key";

/// A single GET against the platform API.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, params: &Params<'_>) -> std::result::Result<Value, ApiError>;
}

/// reqwest-backed [`Transport`].
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    api_key: String,
    policy: RetryPolicy,
    gate: RateGate,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// What one attempt produced.
enum Attempt {
    Success(Value),
    Failed(ApiError),
}

impl HttpTransport {
    /// Create a transport from API settings and a credential.
    pub fn new(config: &ApiConfig, api_key: impl Into<String>) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client: create_client(config)?,
            base_url: Url::parse(&base)?,
            api_key: api_key.into(),
            policy: RetryPolicy::from_config(config),
            gate: RateGate::new(
                config.max_concurrent,
                std::time::Duration::from_millis(config.request_delay_ms),
            ),
        })
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the rate gate.
    pub fn with_gate(mut self, gate: RateGate) -> Self {
        self.gate = gate;
        self
    }

    /// Build the request URL. The credential is appended only when asked for.
    fn url(&self, path: &str, params: &Params<'_>, with_key: bool) -> std::result::Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::new(path).with_exception(e))?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in params {
                query.append_pair(name, value);
            }
            if with_key {
                query.append_pair(KEY_PARAM, &self.api_key);
            }
        }
        Ok(url)
    }

    async fn attempt(&self, url: &Url, mut error: ApiError) -> Attempt {
        let _permit = self.gate.acquire().await;

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => return Attempt::Failed(error.with_exception(e.without_url())),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error.status = Some(status.as_u16());
                return Attempt::Failed(error.with_exception(e.without_url()));
            }
        };

        if status != StatusCode::OK {
            return Attempt::Failed(error.with_response(status.as_u16(), &body));
        }

        match serde_json::from_str(&body) {
            Ok(value) => Attempt::Success(value),
            Err(e) => Attempt::Failed(
                error
                    .with_response(status.as_u16(), &body)
                    .with_exception(format!("decode: {e}")),
            ),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, params: &Params<'_>) -> std::result::Result<Value, ApiError> {
        let public_url = self.url(path, params, false)?;
        let url = self.url(path, params, true)?;
        let mut error = ApiError::new(public_url.as_str());

        for attempt in 0..self.policy.max_attempts() {
            error.attempts = attempt + 1;

            match self.attempt(&url, error.clone()).await {
                Attempt::Success(value) => return Ok(value),
                Attempt::Failed(failed) => error = failed,
            }

            if error.is_fatal() || !self.policy.has_next(attempt) {
                break;
            }

            let delay = self.policy.delay(attempt);
            log::debug!(
                "Attempt {}/{} failed for {} ({}); retrying in {:?}",
                attempt + 1,
                self.policy.max_attempts(),
                error.url,
                error.status.map_or_else(|| "no response".to_string(), |s| s.to_string()),
                delay
            );
            tokio::time::sleep(delay).await;
        }

        Err(error)
    }
}
