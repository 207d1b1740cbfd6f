//! Authenticator implementation
//!
//! Applies credentials to requests and manages token refresh.

use super::types::{AuthConfig, CachedToken};
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached token for password grant auth
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator that shares an existing connection pool
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config {
            AuthConfig::None => Ok(req),
            AuthConfig::Bearer { token } => Ok(req.bearer_auth(token)),
            AuthConfig::Password { .. } => {
                let token = self.get_or_refresh_token().await?;
                Ok(req.bearer_auth(token))
            }
        }
    }

    /// Current access token, fetching one if needed
    ///
    /// Returns `None` when the config carries no credentials.
    pub async fn token(&self) -> Result<Option<String>> {
        match &self.config {
            AuthConfig::None => Ok(None),
            AuthConfig::Bearer { token } => Ok(Some(token.clone())),
            AuthConfig::Password { .. } => self.get_or_refresh_token().await.map(Some),
        }
    }

    /// Get a valid token, refreshing if necessary
    async fn get_or_refresh_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.fetch_new_token().await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Fetch a new token based on auth type
    async fn fetch_new_token(&self) -> Result<CachedToken> {
        match &self.config {
            AuthConfig::Password {
                token_url,
                username,
                password,
            } => self.fetch_password_grant(token_url, username, password).await,
            _ => Err(Error::auth("Token refresh not supported for this auth type")),
        }
    }

    /// Exchange username and password for an access token
    async fn fetch_password_grant(
        &self,
        token_url: &str,
        username: &str,
        password: &str,
    ) -> Result<CachedToken> {
        debug!("Requesting access token for {username} from {token_url}");

        let form = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
        ];

        let response = self
            .http_client
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenRefresh {
                message: format!("Token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| Error::Auth {
            message: format!("Malformed token response: {e}"),
        })?;
        token_response.into_cached_token()
    }

    /// Drop the cached token so the next request fetches a fresh one
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    /// Token with its expiry; a missing `expires_in` never expires
    fn into_cached_token(self) -> Result<CachedToken> {
        match self.expires_in {
            None => Ok(CachedToken::new(self.access_token, None)),
            Some(secs) if secs < 0 => Err(Error::auth(
                "Malformed token response: expires_in must not be negative",
            )),
            Some(secs) => CachedToken::expires_in(self.access_token, secs)
                .ok_or_else(|| Error::auth("Malformed token response: expires_in out of range")),
        }
    }
}
