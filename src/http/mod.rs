//! HTTP transport
//!
//! - **Retries**: timeouts, connection failures, 429 and 500/502/503/504,
//!   with capped exponential backoff
//! - **Rate Limiting**: optional governor token bucket per session
//! - **Authentication**: credentials applied through [`crate::auth`]

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, RequestConfig, RetryPolicy};
pub use rate_limit::RateLimiterConfig;
