//! Auth configuration types

use chrono::{DateTime, Utc};

/// Seconds before the reported expiry at which a token is treated as stale
pub const TOKEN_EXPIRY_BUFFER_SECS: i64 = 60;

/// Authentication configuration
#[derive(Clone, Default)]
pub enum AuthConfig {
    /// No authentication required
    #[default]
    None,

    /// Pre-issued bearer token
    Bearer {
        /// The bearer token
        token: String,
    },

    /// Password grant against the service token endpoint
    Password {
        /// Token endpoint URL
        token_url: String,
        /// Account name
        username: String,
        /// Account password
        password: String,
    },
}

impl AuthConfig {
    /// Create a password grant config
    pub fn password(
        token_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::Password {
            token_url: token_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Create a bearer token config
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &"***").finish(),
            Self::Password {
                token_url,
                username,
                ..
            } => f
                .debug_struct("Password")
                .field("token_url", token_url)
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    ///
    /// `None` when the expiry is not a representable instant.
    pub fn expires_in(token: String, seconds: i64) -> Option<Self> {
        let expires_at = chrono::TimeDelta::try_seconds(seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))?;
        Some(Self {
            token,
            expires_at: Some(expires_at),
        })
    }

    /// Check if the token is expired, counting the refresh buffer as expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(TOKEN_EXPIRY_BUFFER_SECS);
                Utc::now() + buffer >= expires_at
            }
            None => false,
        }
    }
}
