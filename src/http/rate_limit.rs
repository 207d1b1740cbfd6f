//! Client-side request rate limit
//!
//! One governor token bucket per session; every attempt, retries included,
//! takes a permit before it is sent.

use governor::{DefaultDirectRateLimiter, Quota};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Requests allowed per second, with an optional burst
///
/// Zero is rejected when the config is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimiterConfig {
    pub requests_per_second: NonZeroU32,
    /// Defaults to `requests_per_second`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst_size: Option<NonZeroU32>,
}

impl RateLimiterConfig {
    pub fn per_second(requests_per_second: NonZeroU32) -> Self {
        Self {
            requests_per_second,
            burst_size: None,
        }
    }

    #[must_use]
    pub fn with_burst(mut self, burst_size: NonZeroU32) -> Self {
        self.burst_size = Some(burst_size);
        self
    }

    fn quota(&self) -> Quota {
        let quota = Quota::per_second(self.requests_per_second);
        match self.burst_size {
            Some(burst) => quota.allow_burst(burst),
            None => quota,
        }
    }
}

pub(crate) struct RateLimiter(DefaultDirectRateLimiter);

impl RateLimiter {
    pub(crate) fn new(config: &RateLimiterConfig) -> Self {
        Self(DefaultDirectRateLimiter::direct(config.quota()))
    }

    /// Wait until a request can be made
    pub(crate) async fn wait(&self) {
        self.0.until_ready().await;
    }
}
