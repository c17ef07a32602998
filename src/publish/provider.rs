//! Hosted release providers.

use crate::git::RepoCoordinates;
use async_trait::async_trait;
use thiserror::Error;

/// Why a provider could not create a release
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The token variable is unset; the provider is skipped
    #[error("environment variable {0} is not set")]
    MissingToken(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Response(String),
}

/// Everything a provider needs to create one release
#[derive(Debug, Clone)]
pub struct ReleaseRequest<'a> {
    pub coordinates: &'a RepoCoordinates,
    pub tag_name: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub token: &'a str,
    pub draft: bool,
    pub prerelease: bool,
}

/// A code host that can publish a release for a pushed tag
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Environment variable holding the access token
    fn token_ref(&self) -> &str;

    /// Title template, rendered against the release context
    fn release_name(&self) -> &str;

    fn draft(&self) -> bool {
        false
    }

    /// Create the release and return its web URL
    async fn create_release(&self, request: &ReleaseRequest<'_>) -> Result<String, ProviderError>;
}

pub(crate) const USER_AGENT: &str = concat!("release-flow/", env!("CARGO_PKG_VERSION"));

/// Turn a non-success response into [ProviderError::Api]
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ProviderError::Api {
        status: status.as_u16(),
        message: message.trim().to_string(),
    })
}
