//! Authentication module
//!
//! Supports: static Bearer token and the service's password grant.
//!
//! The `Authenticator` applies credentials to outgoing requests and caches
//! password-grant tokens until shortly before they expire.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken, TOKEN_EXPIRY_BUFFER_SECS};
