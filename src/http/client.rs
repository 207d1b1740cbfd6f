//! Retrying HTTP transport for the record service
//!
//! Every call goes through [`HttpClient::request`]: wait for the rate
//! limiter, attach credentials, send, and classify the outcome. Timeouts,
//! connection failures, 429 and 500/502/503/504 are retried under the
//! session's [`RetryPolicy`]; anything else is returned at once.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::auth::{AuthConfig, Authenticator};
use crate::error::{Error, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry-After assumed when a 429 does not say
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// How often, and how patiently, a failed request is repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry; doubled for each one after
    pub initial_backoff: Duration,
    /// Cap on any single wait
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Total attempts, counting the first
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait after failed attempt number `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Wait for a rate-limited attempt, honouring Retry-After up to the cap
    fn delay_for(&self, error: &Error, attempt: u32) -> Duration {
        match error {
            Error::RateLimited {
                retry_after_seconds,
            } => Duration::from_secs(*retry_after_seconds).min(self.max_backoff),
            _ => self.backoff(attempt),
        }
    }
}

/// Transport settings for one session
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Client-side request rate limit
    pub rate_limit: Option<RateLimiterConfig>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            rate_limit: None,
            user_agent: format!("hinaturedb-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// What to send with one request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters, in order
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
    /// Send `Cache-Control: no-store`
    pub no_store: bool,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Ask intermediaries not to serve a cached copy
    #[must_use]
    pub fn no_store(mut self) -> Self {
        self.no_store = true;
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    authenticator: Option<Authenticator>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Build a client without credentials
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(Error::Transport)?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            authenticator: None,
            rate_limiter,
        })
    }

    /// Build a client that authenticates every request
    ///
    /// Token requests share this client's connection pool.
    pub fn with_auth(config: HttpClientConfig, auth_config: AuthConfig) -> Result<Self> {
        let mut http = Self::new(config)?;
        http.authenticator = Some(Authenticator::with_client(auth_config, http.client.clone()));
        Ok(http)
    }

    pub fn authenticator(&self) -> Option<&Authenticator> {
        self.authenticator.as_ref()
    }

    /// Send a request, retrying transient failures
    ///
    /// Only 2xx responses are returned; the last failure is returned once
    /// the retry policy is used up.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<Response> {
        let policy = self.config.retry;
        let mut attempt = 0;

        loop {
            if let Some(limiter) = &self.rate_limiter {
                limiter.wait().await;
            }

            let error = match self.build(&method, url, &config).await?.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("{method} {url} -> {}", response.status());
                    return Ok(response);
                }
                Ok(response) => status_error(response).await,
                Err(e) => self.transport_error(e),
            };

            if attempt + 1 >= policy.attempts() || !error.is_retryable() {
                debug!("{method} {url} failed: {error}");
                return Err(error);
            }

            let delay = policy.delay_for(&error, attempt);
            warn!(
                "{method} {url} failed ({error}), attempt {}/{}, retrying in {delay:?}",
                attempt + 1,
                policy.attempts()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Send a request and decode the JSON body into `T`
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let response = self.request(method, url, config).await?;
        let bytes = response.bytes().await.map_err(Error::Transport)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::decode(format!("Unexpected response shape: {e}")))
    }

    async fn build(
        &self,
        method: &Method,
        url: &str,
        config: &RequestConfig,
    ) -> Result<RequestBuilder> {
        let mut req = self.client.request(method.clone(), url);

        if !config.query.is_empty() {
            req = req.query(&config.query);
        }
        if config.no_store {
            req = req.header(reqwest::header::CACHE_CONTROL, "no-store");
        }
        if let Some(body) = &config.body {
            req = req.json(body);
        }

        match &self.authenticator {
            Some(auth) => auth.apply(req).await,
            None => Ok(req),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            Error::Transport(e)
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_authenticator", &self.authenticator.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Turn a non-2xx response into an error, keeping the body for diagnosis
async fn status_error(response: Response) -> Error {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Error::RateLimited {
            retry_after_seconds: retry_after(&response),
        };
    }
    let body = response.text().await.unwrap_or_default();
    Error::http_status(status.as_u16(), body)
}

fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
