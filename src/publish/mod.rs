//! Publication façade: npm, then GitHub, then GitLab.
//!
//! Every step is independent and best effort. Failures are reported as
//! warnings and never abort the run; the first release URL obtained is
//! recorded on the release context.

pub mod github;
pub mod gitlab;
pub mod npm;
pub mod provider;

pub use github::GithubProvider;
pub use gitlab::GitlabProvider;
pub use npm::NpmPublisher;
pub use provider::{Provider, ProviderError, ReleaseRequest};

use crate::config::Config;
use crate::context::ReleaseContext;
use crate::manifest::ManifestStore;
use crate::ui::formatter;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// What publication achieved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicationSummary {
    pub npm_published: bool,
    pub release_url: Option<String>,
    pub failures: usize,
}

/// Runs the enabled publication steps in a fixed order
pub struct Publisher {
    npm: Option<NpmPublisher>,
    providers: Vec<Box<dyn Provider>>,
    env: BTreeMap<String, String>,
}

impl Publisher {
    pub fn new(
        npm: Option<NpmPublisher>,
        providers: Vec<Box<dyn Provider>>,
        env: BTreeMap<String, String>,
    ) -> Self {
        Publisher { npm, providers, env }
    }

    /// Enabled steps from configuration, tokens from `env`
    pub fn from_config(config: &Config, env: BTreeMap<String, String>) -> Self {
        let npm = Some(NpmPublisher::new(config.npm.clone(), env.get(npm::ENV_OTP).cloned()))
            .filter(NpmPublisher::enabled);

        let mut providers: Vec<Box<dyn Provider>> = Vec::new();
        if config.github.release {
            providers.push(Box::new(GithubProvider::new(config.github.clone())));
        }
        if config.gitlab.release {
            providers.push(Box::new(GitlabProvider::new(config.gitlab.clone())));
        }
        Publisher::new(npm, providers, env)
    }

    /// Like [Publisher::from_config] with the process environment
    pub fn from_process(config: &Config) -> Self {
        Publisher::from_config(config, std::env::vars().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.npm.is_none() && self.providers.is_empty()
    }

    fn failed(summary: &mut PublicationSummary, step: &str, message: &str) {
        warn!(step, "publication step failed: {}", message);
        formatter::display_warning(&format!("{} failed: {}", step, message));
        summary.failures += 1;
    }

    pub async fn publish(
        &self,
        context: &ReleaseContext,
        manifest: &dyn ManifestStore,
    ) -> PublicationSummary {
        let mut summary = PublicationSummary::default();

        if let Some(npm) = &self.npm {
            self.publish_npm(npm, context, manifest, &mut summary);
        }

        for provider in &self.providers {
            self.create_release(provider.as_ref(), context, &mut summary).await;
        }

        summary.release_url = context.release_url().map(str::to_string);
        summary
    }

    fn publish_npm(
        &self,
        npm: &NpmPublisher,
        context: &ReleaseContext,
        manifest: &dyn ManifestStore,
        summary: &mut PublicationSummary,
    ) {
        match manifest.read(context.cwd()) {
            Ok(Some(info)) if info.private => {
                info!("private package, skipping npm publish");
                formatter::display_status("Private package, skipping npm publish");
                return;
            }
            Ok(Some(_)) => {}
            Ok(None) => {
                Self::failed(summary, "npm publish", "no package.json found");
                return;
            }
            Err(e) => {
                Self::failed(summary, "npm publish", &e.to_string());
                return;
            }
        }

        if context.dry_run() {
            formatter::display_dry_run(&npm.display_command());
            return;
        }

        formatter::display_status("Publishing to npm");
        match npm.publish(context.cwd()) {
            Ok(()) => {
                summary.npm_published = true;
                formatter::display_success("Published to npm");
            }
            Err(e) => Self::failed(summary, "npm publish", &e.to_string()),
        }
    }

    async fn create_release(
        &self,
        provider: &dyn Provider,
        context: &ReleaseContext,
        summary: &mut PublicationSummary,
    ) {
        let step = format!("{} release", provider.name());

        let token = match self.env.get(provider.token_ref()).filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => {
                let skipped = ProviderError::MissingToken(provider.token_ref().to_string());
                warn!(provider = provider.name(), "{}, skipping", skipped);
                formatter::display_warning(&format!("{} skipped: {}", step, skipped));
                return;
            }
        };
        let Some(coordinates) = context.repository() else {
            Self::failed(summary, &step, "repository coordinates unknown (no parsable remote URL)");
            return;
        };
        let Some(tag_name) = context.tag_name() else {
            Self::failed(summary, &step, "no tag name resolved");
            return;
        };

        let title = context.render(provider.release_name());
        if context.dry_run() {
            formatter::display_dry_run(&format!(
                "create {} \"{}\" for {} on {}",
                step,
                title,
                tag_name,
                coordinates.path()
            ));
            return;
        }

        let request = ReleaseRequest {
            coordinates,
            tag_name,
            title: &title,
            body: context.release_notes().unwrap_or_default(),
            token,
            draft: provider.draft(),
            prerelease: context.is_prerelease(),
        };
        match provider.create_release(&request).await {
            Ok(url) => {
                formatter::display_success(&format!("{} created: {}", step, url));
                if !context.record_release_url(url) {
                    info!(provider = provider.name(), "release URL already recorded");
                }
            }
            Err(e) => Self::failed(summary, &step, &e.to_string()),
        }
    }
}
