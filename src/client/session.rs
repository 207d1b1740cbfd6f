//! Connection state shared by every call on a client

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::pagination::PageSize;
use tracing::debug;
use url::Url;

/// One logical connection to the service
///
/// Holds the endpoint, the pooled HTTP client with its credentials, and the
/// paging defaults. Nothing in it changes per call except the cached access
/// token, which sits behind its own lock.
#[derive(Debug)]
pub struct Session {
    base_url: Url,
    http: HttpClient,
    default_page_size: PageSize,
    max_page_size: u32,
}

impl Session {
    /// Open a session from a validated config
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = config.base_url()?;
        let http = HttpClient::with_auth(config.http_config(), config.auth_config()?)?;

        debug!("Opened session to {base_url}");

        Ok(Self {
            base_url,
            http,
            default_page_size: PageSize::new(config.default_page_size, config.max_page_size)?,
            max_page_size: config.max_page_size,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn default_page_size(&self) -> PageSize {
        self.default_page_size
    }

    pub fn max_page_size(&self) -> u32 {
        self.max_page_size
    }

    /// Validate a caller-supplied page size against this session's maximum
    pub fn page_size(&self, value: u32) -> Result<PageSize> {
        PageSize::new(value, self.max_page_size)
    }

    /// Absolute URL of a service path
    pub fn endpoint(&self, path: &str) -> Result<String> {
        self.base_url
            .join(path)
            .map(String::from)
            .map_err(Error::InvalidUrl)
    }

    /// Forget the cached access token
    pub async fn close(&self) {
        if let Some(auth) = self.http.authenticator() {
            auth.clear_cache().await;
        }
        debug!("Closed session to {}", self.base_url);
    }
}
