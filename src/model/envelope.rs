//! Service response envelope

use crate::error::{Error, Result};
use serde::Deserialize;

/// Wrapper every service response comes in
///
/// `success` is required; a body without it is rejected at decode time.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub has_more: bool,
    pub cursor: Option<String>,
    pub total: Option<u64>,
}

impl<T> ApiResponse<T> {
    /// Message the service attached, or an empty string
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    /// Turn a failed envelope into a service error and a successful one into its data
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(Error::service(self.message.unwrap_or_else(|| {
                "request rejected without a message".to_string()
            })));
        }
        self.data
            .ok_or_else(|| Error::decode("successful response carried no data"))
    }
}
