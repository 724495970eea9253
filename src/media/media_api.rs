//! Media API abstraction
//!
//! Token and error types shared by every media API client.

use std::fmt;
use thiserror::Error;

/// Short-lived bearer credential issued by the media API.
///
/// The value is opaque; `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Playable URL returned by a successful lookup
pub type StreamUrl = String;

#[derive(Debug, Error)]
pub enum MediaApiError {
    /// 404 or 410: the resource is missing but the credential was accepted
    #[error("resource not found (HTTP {status})")]
    NotFound { status: u16 },

    #[error("credential rejected (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("media API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("token response did not contain an access token")]
    MissingToken,

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl MediaApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, MediaApiError::NotFound { .. })
    }
}

/// Trait for media API clients that can mint and exercise access tokens
#[async_trait::async_trait]
pub trait MediaApi: Send + Sync {
    /// Request a brand new access token using the client credentials
    async fn request_new_access_token(&self) -> Result<AccessToken, MediaApiError>;

    /// Resolve the stream URL of a resource using the given token
    async fn lookup_stream_url(
        &self,
        host: &str,
        user_agent: &str,
        resource_id: &str,
        token: &AccessToken,
    ) -> Result<StreamUrl, MediaApiError>;

    /// Get the API name for display purposes
    fn api_name(&self) -> &'static str;
}
