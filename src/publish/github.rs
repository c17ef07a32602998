use super::provider::{check_status, Provider, ProviderError, ReleaseRequest, USER_AGENT};
use crate::config::GithubConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

/// GitHub releases (`POST /repos/{owner}/{repo}/releases`)
pub struct GithubProvider {
    config: GithubConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct CreatedRelease {
    html_url: String,
}

impl GithubProvider {
    pub fn new(config: GithubConfig) -> Self {
        GithubProvider {
            config,
            client: Client::new(),
        }
    }

    fn endpoint(&self, request: &ReleaseRequest<'_>) -> String {
        format!(
            "{}/repos/{}/releases",
            self.config.api_url.trim_end_matches('/'),
            request.coordinates.path()
        )
    }
}

#[async_trait]
impl Provider for GithubProvider {
    fn name(&self) -> &str {
        "GitHub"
    }

    fn token_ref(&self) -> &str {
        &self.config.token_ref
    }

    fn release_name(&self) -> &str {
        &self.config.release_name
    }

    fn draft(&self) -> bool {
        self.config.draft
    }

    #[instrument(skip_all, fields(provider = "github", tag = request.tag_name))]
    async fn create_release(&self, request: &ReleaseRequest<'_>) -> Result<String, ProviderError> {
        let url = self.endpoint(request);
        debug!("creating release at {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", request.token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .json(&json!({
                "tag_name": request.tag_name,
                "name": request.title,
                "body": request.body,
                "draft": request.draft,
                "prerelease": request.prerelease,
            }))
            .send()
            .await?;

        let release: CreatedRelease = check_status(response).await?.json().await?;
        Ok(release.html_url)
    }
}
