//! Plugins shipped with the binary.

use super::{Capabilities, Plugin};
use crate::context::ReleaseContext;
use crate::hooks::Phase;
use crate::ui::formatter;
use anyhow::Context as _;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

pub const VERSION_FILE: &str = "version-file";
pub const RELEASE_SUMMARY: &str = "release-summary";

fn path_option(options: &toml::Table, default: &str) -> anyhow::Result<PathBuf> {
    match options.get("path") {
        None => Ok(PathBuf::from(default)),
        Some(toml::Value::String(path)) if !path.is_empty() => Ok(PathBuf::from(path)),
        Some(other) => anyhow::bail!("option `path` must be a non-empty string, got {}", other),
    }
}

/// Writes the new version to a plain text file after the bump.
///
/// Runs once the release commit and tag are pushed, so the file is a local
/// artefact for later build steps and is never part of the release commit.
#[derive(Debug, Clone)]
pub struct VersionFilePlugin {
    path: PathBuf,
}

impl VersionFilePlugin {
    pub fn from_options(options: &toml::Table) -> anyhow::Result<Box<dyn Plugin>> {
        Ok(Box::new(VersionFilePlugin {
            path: path_option(options, "VERSION")?,
        }))
    }
}

#[async_trait]
impl Plugin for VersionFilePlugin {
    fn name(&self) -> &str {
        VERSION_FILE
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::only(&[Phase::PostBump])
    }

    fn on_phase(&self, _phase: Phase, context: &ReleaseContext) -> anyhow::Result<()> {
        let version = context.version().context("no version resolved")?;
        let path = context.cwd().join(&self.path);
        if context.dry_run() {
            formatter::display_dry_run(&format!("write {} to {}", version, path.display()));
            return Ok(());
        }
        std::fs::write(&path, format!("{}\n", version))
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "version file written");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    name: Option<&'a str>,
    version: Option<&'a str>,
    tag: Option<&'a str>,
    release_url: Option<&'a str>,
    date: Option<&'a str>,
}

/// Records what was released as JSON once publication is over
#[derive(Debug, Clone)]
pub struct ReleaseSummaryPlugin {
    path: PathBuf,
}

impl ReleaseSummaryPlugin {
    pub fn from_options(options: &toml::Table) -> anyhow::Result<Box<dyn Plugin>> {
        Ok(Box::new(ReleaseSummaryPlugin {
            path: path_option(options, "release-summary.json")?,
        }))
    }
}

#[async_trait]
impl Plugin for ReleaseSummaryPlugin {
    fn name(&self) -> &str {
        RELEASE_SUMMARY
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::only(&[Phase::PostRelease])
    }

    async fn after_release(&self, context: &ReleaseContext) -> anyhow::Result<()> {
        let path = context.cwd().join(&self.path);
        if context.dry_run() {
            formatter::display_dry_run(&format!("write release summary to {}", path.display()));
            return Ok(());
        }
        let summary = Summary {
            name: context.name(),
            version: context.version(),
            tag: context.tag_name(),
            release_url: context.release_url(),
            date: context.date(),
        };
        let mut json = serde_json::to_string_pretty(&summary)?;
        json.push('\n');
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "release summary written");
        Ok(())
    }
}
