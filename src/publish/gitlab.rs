use super::provider::{check_status, Provider, ProviderError, ReleaseRequest, USER_AGENT};
use crate::config::GitlabConfig;
use crate::git::RepoCoordinates;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, instrument};
use url::form_urlencoded;

/// GitLab releases (`POST /projects/{id}/releases`)
pub struct GitlabProvider {
    config: GitlabConfig,
    client: Client,
}

/// URL-encoded project path, the form GitLab accepts as a project id
fn project_id(coordinates: &RepoCoordinates) -> String {
    form_urlencoded::byte_serialize(coordinates.path().as_bytes()).collect()
}

/// Web page of a release
fn release_page(coordinates: &RepoCoordinates, tag: &str) -> String {
    format!("{}/-/releases/{}", coordinates.web_url(), tag)
}

impl GitlabProvider {
    pub fn new(config: GitlabConfig) -> Self {
        GitlabProvider {
            config,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Provider for GitlabProvider {
    fn name(&self) -> &str {
        "GitLab"
    }

    fn token_ref(&self) -> &str {
        &self.config.token_ref
    }

    fn release_name(&self) -> &str {
        &self.config.release_name
    }

    #[instrument(skip_all, fields(provider = "gitlab", tag = request.tag_name))]
    async fn create_release(&self, request: &ReleaseRequest<'_>) -> Result<String, ProviderError> {
        let url = format!(
            "{}/projects/{}/releases",
            self.config.api_url.trim_end_matches('/'),
            project_id(request.coordinates)
        );
        debug!("creating release at {}", url);

        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", request.token)
            .header("User-Agent", USER_AGENT)
            .json(&json!({
                "tag_name": request.tag_name,
                "name": request.title,
                "description": request.body,
            }))
            .send()
            .await?;
        check_status(response).await?;

        Ok(release_page(request.coordinates, request.tag_name))
    }
}
