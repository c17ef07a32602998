//! The release context: one record per invocation, extended as the
//! pipeline advances and never reset.

use crate::cli::args::InvocationOptions;
use crate::config::Config;
use crate::domain::BumpKind;
use crate::error::{ReleaseError, Result};
use crate::git::RepoCoordinates;
use crate::template::{self, Variables};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// State shared by every pipeline component.
///
/// Fields start unset and can be written exactly once; a second write is an
/// error. The record is `Sync` so plugins may read it across `.await`.
#[derive(Debug)]
pub struct ReleaseContext {
    cwd: PathBuf,
    config: Config,
    options: InvocationOptions,
    name: OnceLock<String>,
    branch: OnceLock<String>,
    latest_version: OnceLock<String>,
    version: OnceLock<String>,
    increment: OnceLock<Option<BumpKind>>,
    preid: OnceLock<Option<String>>,
    commits: OnceLock<Vec<String>>,
    date: OnceLock<String>,
    changelog: OnceLock<String>,
    release_notes: OnceLock<String>,
    tag_name: OnceLock<String>,
    repository: OnceLock<RepoCoordinates>,
    release_url: OnceLock<String>,
}

fn set_once<T>(cell: &OnceLock<T>, field: &str, value: T) -> Result<()> {
    cell.set(value).map_err(|_| {
        ReleaseError::workflow(format!("release context field `{}` is already set", field))
    })
}

impl ReleaseContext {
    pub fn new(cwd: impl Into<PathBuf>, config: Config, options: InvocationOptions) -> Self {
        ReleaseContext {
            cwd: cwd.into(),
            config,
            options,
            name: OnceLock::new(),
            branch: OnceLock::new(),
            latest_version: OnceLock::new(),
            version: OnceLock::new(),
            increment: OnceLock::new(),
            preid: OnceLock::new(),
            commits: OnceLock::new(),
            date: OnceLock::new(),
            changelog: OnceLock::new(),
            release_notes: OnceLock::new(),
            tag_name: OnceLock::new(),
            repository: OnceLock::new(),
            release_url: OnceLock::new(),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &InvocationOptions {
        &self.options
    }

    pub fn dry_run(&self) -> bool {
        self.options.dry_run
    }

    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
        set_once(&self.name, "name", name.into())
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.get().map(String::as_str)
    }

    pub fn set_branch(&self, branch: impl Into<String>) -> Result<()> {
        set_once(&self.branch, "branch", branch.into())
    }

    pub fn latest_version(&self) -> Option<&str> {
        self.latest_version.get().map(String::as_str)
    }

    pub fn set_latest_version(&self, version: impl Into<String>) -> Result<()> {
        set_once(&self.latest_version, "latest_version", version.into())
    }

    pub fn version(&self) -> Option<&str> {
        self.version.get().map(String::as_str)
    }

    pub fn set_version(&self, version: impl Into<String>) -> Result<()> {
        set_once(&self.version, "version", version.into())
    }

    pub fn increment(&self) -> Option<BumpKind> {
        self.increment.get().copied().flatten()
    }

    pub fn set_increment(&self, kind: Option<BumpKind>) -> Result<()> {
        set_once(&self.increment, "increment", kind)
    }

    pub fn preid(&self) -> Option<&str> {
        self.preid.get().and_then(|p| p.as_deref())
    }

    pub fn set_preid(&self, preid: Option<String>) -> Result<()> {
        set_once(&self.preid, "preid", preid)
    }

    pub fn commits(&self) -> &[String] {
        self.commits.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_commits(&self, commits: Vec<String>) -> Result<()> {
        set_once(&self.commits, "commits", commits)
    }

    pub fn date(&self) -> Option<&str> {
        self.date.get().map(String::as_str)
    }

    pub fn set_date(&self, date: impl Into<String>) -> Result<()> {
        set_once(&self.date, "date", date.into())
    }

    pub fn changelog(&self) -> Option<&str> {
        self.changelog.get().map(String::as_str)
    }

    pub fn set_changelog(&self, changelog: impl Into<String>) -> Result<()> {
        set_once(&self.changelog, "changelog", changelog.into())
    }

    pub fn release_notes(&self) -> Option<&str> {
        self.release_notes.get().map(String::as_str)
    }

    pub fn set_release_notes(&self, notes: impl Into<String>) -> Result<()> {
        set_once(&self.release_notes, "release_notes", notes.into())
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.tag_name.get().map(String::as_str)
    }

    pub fn set_tag_name(&self, tag: impl Into<String>) -> Result<()> {
        set_once(&self.tag_name, "tag_name", tag.into())
    }

    pub fn repository(&self) -> Option<&RepoCoordinates> {
        self.repository.get()
    }

    pub fn set_repository(&self, coordinates: RepoCoordinates) -> Result<()> {
        set_once(&self.repository, "repository", coordinates)
    }

    pub fn release_url(&self) -> Option<&str> {
        self.release_url.get().map(String::as_str)
    }

    /// Keep the first release URL; later ones are ignored
    pub fn record_release_url(&self, url: impl Into<String>) -> bool {
        self.release_url.set(url.into()).is_ok()
    }

    /// Whether the next version carries a pre-release segment
    pub fn is_prerelease(&self) -> bool {
        self.version().map(|v| v.contains('-')).unwrap_or(false)
    }

    /// Every scalar field as a template variable; unset fields are empty
    pub fn variables(&self) -> Variables {
        let mut vars = Variables::new();
        let mut put = |key: &str, value: Option<&str>| {
            vars.insert(key.to_string(), value.unwrap_or_default().to_string());
        };

        put("version", self.version());
        put("latest_version", self.latest_version());
        put("name", self.name());
        put("branch", self.branch());
        put("tag_name", self.tag_name());
        put("increment", self.increment().map(|k| k.as_str()));
        put("preid", self.preid());
        put("date", self.date());
        put("changelog", self.changelog());
        put("release_notes", self.release_notes());
        put("release_url", self.release_url());
        put("repo_owner", self.repository().map(|r| r.owner.as_str()));
        put("repo_name", self.repository().map(|r| r.name.as_str()));
        put("dry_run", Some(if self.dry_run() { "true" } else { "false" }));
        let cwd = self.cwd.display().to_string();
        put("cwd", Some(&cwd));

        vars
    }

    /// Render a template against the current variables
    pub fn render(&self, template: &str) -> String {
        template::render(template, &self.variables())
    }
}
