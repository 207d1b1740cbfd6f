//! Client configuration
//!
//! A [`ClientConfig`] describes how to reach the service: endpoint,
//! credentials, retry policy and paging defaults. It can be written in code,
//! read from a YAML or JSON file, or assembled from `HINATUREDB_*`
//! environment variables.

use crate::auth::AuthConfig;
use crate::client::endpoints;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig, RetryPolicy};
use crate::pagination::{PageSize, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::types::{LogLevel, OptionStringExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variable holding the service URL
pub const ENV_URL: &str = "HINATUREDB_URL";
/// Environment variable holding the account name
pub const ENV_USERNAME: &str = "HINATUREDB_USERNAME";
/// Environment variable holding the account password
pub const ENV_PASSWORD: &str = "HINATUREDB_PASSWORD";
/// Environment variable holding a pre-issued bearer token
pub const ENV_TOKEN: &str = "HINATUREDB_TOKEN";
/// Environment variable overriding the default page size
pub const ENV_PAGE_SIZE: &str = "HINATUREDB_PAGE_SIZE";

/// Everything needed to open a session
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Service base URL
    pub url: String,
    /// Account name for the password grant
    pub username: Option<String>,
    /// Account password for the password grant
    pub password: Option<String>,
    /// Pre-issued bearer token, used instead of username/password
    pub token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// First retry delay in milliseconds
    pub initial_backoff_ms: u64,
    /// Cap on the retry delay in milliseconds
    pub max_backoff_ms: u64,
    /// Page size used when the caller does not pass one
    pub default_page_size: u32,
    /// Largest page size the service accepts
    pub max_page_size: u32,
    /// Client-side request rate limit
    pub rate_limit: Option<RateLimiterConfig>,
    /// Override for the User-Agent header
    pub user_agent: Option<String>,
    /// Log level for the command-line tool
    pub log_level: LogLevel,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: None,
            password: None,
            token: None,
            timeout_secs: 30,
            max_retries: 2,
            initial_backoff_ms: 2_000,
            max_backoff_ms: 10_000,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            rate_limit: None,
            user_agent: None,
            log_level: LogLevel::default(),
        }
    }
}

impl ClientConfig {
    /// Config for `url` with default settings and no credentials
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Authenticate with the password grant
    #[must_use]
    pub fn with_password(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Authenticate with a pre-issued bearer token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `HINATUREDB_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_URL)
            .none_if_empty()
            .ok_or_else(|| Error::missing_field(ENV_URL))?;

        let mut config = Self::new(url);
        config.username = lookup(ENV_USERNAME).none_if_empty();
        config.password = lookup(ENV_PASSWORD).none_if_empty();
        config.token = lookup(ENV_TOKEN).none_if_empty();

        if let Some(size) = lookup(ENV_PAGE_SIZE).none_if_empty() {
            config.default_page_size = size.parse().map_err(|_| Error::InvalidArgument {
                argument: ENV_PAGE_SIZE.to_string(),
                message: format!("'{size}' is not a page size"),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the config is usable before any connection is attempted
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.max_page_size == 0 {
            return Err(Error::config("max_page_size must be at least 1"));
        }
        PageSize::new(self.default_page_size, self.max_page_size)?;

        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be at least 1"));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(Error::config(
                "initial_backoff_ms must not exceed max_backoff_ms",
            ));
        }

        match (&self.username, &self.password) {
            (Some(_), None) => return Err(Error::missing_field("password")),
            (None, Some(_)) => return Err(Error::missing_field("username")),
            _ => {}
        }

        Ok(())
    }

    /// Parsed service base URL
    pub fn base_url(&self) -> Result<Url> {
        if self.url.is_empty() {
            return Err(Error::missing_field("url"));
        }
        let url = Url::parse(&self.url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "Unsupported URL scheme '{}'",
                url.scheme()
            )));
        }
        Ok(url)
    }

    /// HTTP settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        let defaults = HttpClientConfig::default();
        HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                initial_backoff: Duration::from_millis(self.initial_backoff_ms),
                max_backoff: Duration::from_millis(self.max_backoff_ms),
            },
            rate_limit: self.rate_limit,
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    /// Credentials derived from this config
    ///
    /// A bearer token wins over username/password when both are present.
    pub fn auth_config(&self) -> Result<AuthConfig> {
        if let Some(token) = &self.token {
            return Ok(AuthConfig::bearer(token.clone()));
        }

        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                let token_url = self.base_url()?.join(endpoints::TOKEN)?;
                Ok(AuthConfig::password(
                    token_url.as_str(),
                    username.clone(),
                    password.clone(),
                ))
            }
            (None, None) => Ok(AuthConfig::None),
            (Some(_), None) => Err(Error::missing_field("password")),
            (None, Some(_)) => Err(Error::missing_field("username")),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |secret: &Option<String>| secret.as_ref().map(|_| "***");
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("token", &redacted(&self.token))
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("default_page_size", &self.default_page_size)
            .field("max_page_size", &self.max_page_size)
            .field("rate_limit", &self.rate_limit)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("https://db.example.org");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.max_page_size, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r"
url: https://db.example.org
username: alice
password: secret
default_page_size: 100
rate_limit:
  requests_per_second: 5
  burst_size: 2
";
        let config = ClientConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.default_page_size, 100);
        let rate_limit = config.rate_limit.unwrap();
        assert_eq!(rate_limit.requests_per_second.get(), 5);
        assert_eq!(rate_limit.burst_size.map(|b| b.get()), Some(2));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_from_yaml_rejects_unknown_fields() {
        let yaml = "url: https://db.example.org\npage_sise: 10\n";
        assert!(matches!(
            ClientConfig::from_yaml_str(yaml),
            Err(Error::YamlParse(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"url": "http://localhost:8000", "token": "abc", "max_retries": 0}}"#
        )
        .unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.url, "http://localhost:8000");
        assert_eq!(config.max_retries, 0);
        assert!(matches!(
            config.auth_config().unwrap(),
            AuthConfig::Bearer { .. }
        ));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.yaml");
        std::fs::write(&path, "url: https://db.example.org\nmax_page_size: 200\n").unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.max_page_size, 200);
    }

    #[test]
    fn test_from_missing_file() {
        let err = ClientConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_URL, "https://db.example.org"),
            (ENV_USERNAME, "alice"),
            (ENV_PASSWORD, "secret"),
            (ENV_PAGE_SIZE, "75"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://db.example.org");
        assert_eq!(config.default_page_size, 75);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_from_lookup_requires_url() {
        let err = ClientConfig::from_lookup(lookup_from(&[(ENV_URL, "")])).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == ENV_URL));
    }

    #[test]
    fn test_from_lookup_bad_page_size() {
        let err = ClientConfig::from_lookup(lookup_from(&[
            (ENV_URL, "https://db.example.org"),
            (ENV_PAGE_SIZE, "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            ClientConfig::default().validate(),
            Err(Error::MissingConfigField { .. })
        ));
        assert!(matches!(
            ClientConfig::new("not a url").validate(),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            ClientConfig::new("ftp://db.example.org").validate(),
            Err(Error::Config { .. })
        ));

        let mut config = ClientConfig::new("https://db.example.org");
        config.default_page_size = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidArgument { .. })
        ));

        let mut config = ClientConfig::new("https://db.example.org");
        config.default_page_size = 2000;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::new("https://db.example.org");
        config.username = Some("alice".to_string());
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfigField { ref field }) if field == "password"
        ));
    }

    #[test]
    fn test_auth_config_password_uses_token_endpoint() {
        let config = ClientConfig::new("https://db.example.org/some/prefix/")
            .with_password("alice", "secret");

        match config.auth_config().unwrap() {
            AuthConfig::Password {
                token_url,
                username,
                ..
            } => {
                assert_eq!(token_url, "https://db.example.org/api/v1/token");
                assert_eq!(username, "alice");
            }
            other => panic!("Expected password auth, got {other:?}"),
        }
    }

    #[test]
    fn test_auth_config_prefers_token() {
        let config = ClientConfig::new("https://db.example.org")
            .with_password("alice", "secret")
            .with_token("tok");
        assert!(matches!(
            config.auth_config().unwrap(),
            AuthConfig::Bearer { .. }
        ));
    }

    #[test]
    fn test_auth_config_none() {
        let config = ClientConfig::new("https://db.example.org");
        assert!(matches!(config.auth_config().unwrap(), AuthConfig::None));
    }

    #[test]
    fn test_http_config() {
        let mut config = ClientConfig::new("https://db.example.org");
        config.timeout_secs = 5;
        config.user_agent = Some("birds/1.0".to_string());
        let http = config.http_config();

        assert_eq!(http.timeout, Duration::from_secs(5));
        assert_eq!(http.retry, RetryPolicy::default());
        assert_eq!(http.user_agent, "birds/1.0");
        assert!(http.rate_limit.is_none());

        config.user_agent = None;
        assert!(config.http_config().user_agent.starts_with("hinaturedb-client/"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ClientConfig::new("https://db.example.org")
            .with_password("alice", "hunter2")
            .with_token("tok-secret");
        let debug = format!("{config:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("tok-secret"));
    }
}
