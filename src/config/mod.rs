//! Release configuration: types, defaults and layered resolution.
//!
//! Sources are merged with increasing precedence: built-in defaults, a
//! discovered project config file, environment variables, command-line
//! arguments. See [`resolver::Resolver`].

pub mod merge;
pub mod resolver;
pub mod sources;

use crate::domain::BumpKind;
use crate::hooks::Phase;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use resolver::{resolve, Resolver};

/// Represents the complete configuration for release-flow.
///
/// Contains git, tag, branch, changelog, hook, publication and plugin settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Explicit CI mode; `Some(false)` disables CI auto-detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci: Option<bool>,

    #[serde(default)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[serde(default)]
    pub yes: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<BumpKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preid: Option<String>,

    #[serde(default)]
    pub plugins: Vec<PluginRef>,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub tag: TagConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub branches: BranchesConfig,

    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub hooks: HooksConfig,

    #[serde(default)]
    pub npm: NpmConfig,

    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub gitlab: GitlabConfig,
}

impl Config {
    /// Serialize into a TOML table (the defaults layer of the merge)
    pub fn to_table(&self) -> crate::Result<toml::Table> {
        match toml::Value::try_from(self) {
            Ok(toml::Value::Table(table)) => Ok(table),
            Ok(_) => Err(crate::ReleaseError::config("configuration is not a table")),
            Err(e) => Err(crate::ReleaseError::config(e.to_string())),
        }
    }

    pub fn from_table(table: toml::Table) -> crate::Result<Self> {
        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| crate::ReleaseError::config(e.to_string()))
    }
}

/// A plugin reference: a bare registry name or a name with options
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PluginRef {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        options: toml::Table,
    },
}

impl PluginRef {
    pub fn name(&self) -> &str {
        match self {
            PluginRef::Name(name) => name,
            PluginRef::Detailed { name, .. } => name,
        }
    }

    pub fn options(&self) -> toml::Table {
        match self {
            PluginRef::Name(_) => toml::Table::new(),
            PluginRef::Detailed { options, .. } => options.clone(),
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_true() -> bool {
    true
}

fn default_commit_message() -> String {
    "chore: release ${version}".to_string()
}

/// Version-control settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_true")]
    pub require_clean: bool,

    #[serde(default = "default_true")]
    pub require_remote: bool,

    /// Branches a release may start from; empty allows any branch.
    #[serde(default)]
    pub require_branch: Vec<String>,

    #[serde(default = "default_commit_message")]
    pub commit_message: String,

    /// Extra arguments appended to every push
    #[serde(default)]
    pub push_args: Vec<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            require_clean: true,
            require_remote: true,
            require_branch: Vec::new(),
            commit_message: default_commit_message(),
            push_args: Vec::new(),
        }
    }
}

fn default_tag_prefix() -> String {
    "v".to_string()
}

fn default_tag_annotation() -> String {
    "Release ${version}".to_string()
}

/// Tag settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TagConfig {
    #[serde(default = "default_tag_prefix")]
    pub prefix: String,

    #[serde(default = "default_tag_annotation")]
    pub annotation: String,

    /// Delete a same-named local and remote tag before releasing
    #[serde(default)]
    pub remove_existing: bool,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            prefix: default_tag_prefix(),
            annotation: default_tag_annotation(),
            remove_existing: false,
        }
    }
}

/// Workflow topology
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WorkflowConfig {
    /// Branching-model workflow when true, linear tag-and-push otherwise
    #[serde(default = "default_true")]
    pub git_flow: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        WorkflowConfig { git_flow: true }
    }
}

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_develop_branch() -> String {
    "develop".to_string()
}

fn default_release_prefix() -> String {
    "release/".to_string()
}

/// Branch names used by the branching workflow
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchesConfig {
    #[serde(default = "default_main_branch")]
    pub main: String,

    #[serde(default = "default_develop_branch")]
    pub develop: String,

    #[serde(default = "default_release_prefix")]
    pub release_prefix: String,

    /// Synchronize main/develop from the remote before the workflow
    #[serde(default)]
    pub sync: bool,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            main: default_main_branch(),
            develop: default_develop_branch(),
            release_prefix: default_release_prefix(),
            sync: false,
        }
    }
}

fn default_changelog_file() -> String {
    "CHANGELOG.md".to_string()
}

fn default_changelog_template() -> String {
    "## ${version} (${date})\n\n${commits}\n".to_string()
}

fn default_release_notes() -> String {
    "${changelog}".to_string()
}

fn default_date_locale() -> String {
    "en-US".to_string()
}

/// Changelog settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_changelog_file")]
    pub file: String,

    /// Suggest the bump kind from conventional commits
    #[serde(default = "default_true")]
    pub conventional_commits: bool,

    /// Allowed commit types; empty includes every type
    #[serde(default)]
    pub include_types: Vec<String>,

    #[serde(default)]
    pub group_by_type: bool,

    /// External command whose output replaces the built-in changelog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default = "default_changelog_template")]
    pub template: String,

    #[serde(default = "default_release_notes")]
    pub release_notes: String,

    #[serde(default = "default_date_locale")]
    pub date_locale: String,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            enabled: true,
            file: default_changelog_file(),
            conventional_commits: true,
            include_types: Vec::new(),
            group_by_type: false,
            command: None,
            template: default_changelog_template(),
            release_notes: default_release_notes(),
            date_locale: default_date_locale(),
        }
    }
}

/// Shell commands to run per lifecycle phase
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct HooksConfig {
    #[serde(default, rename = "pre-checks")]
    pub pre_checks: Vec<String>,

    #[serde(default, rename = "pre-workflow")]
    pub pre_workflow: Vec<String>,

    #[serde(default, rename = "post-push")]
    pub post_push: Vec<String>,

    #[serde(default, rename = "post-bump")]
    pub post_bump: Vec<String>,

    #[serde(default, rename = "post-release")]
    pub post_release: Vec<String>,
}

impl HooksConfig {
    pub fn commands(&self, phase: Phase) -> &[String] {
        match phase {
            Phase::PreChecks => &self.pre_checks,
            Phase::PreWorkflow => &self.pre_workflow,
            Phase::PostPush => &self.post_push,
            Phase::PostBump => &self.post_bump,
            Phase::PostRelease => &self.post_release,
        }
    }
}

fn default_dist_tag() -> String {
    "latest".to_string()
}

/// Package-registry publication settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NpmConfig {
    #[serde(default)]
    pub publish: bool,

    #[serde(default = "default_dist_tag")]
    pub tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for NpmConfig {
    fn default() -> Self {
        NpmConfig {
            publish: false,
            tag: default_dist_tag(),
            access: None,
            args: Vec::new(),
        }
    }
}

fn default_release_name() -> String {
    "Release ${version}".to_string()
}

fn default_github_token_ref() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_github_api() -> String {
    "https://api.github.com".to_string()
}

/// GitHub release settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GithubConfig {
    #[serde(default)]
    pub release: bool,

    /// Name of the environment variable holding the access token
    #[serde(default = "default_github_token_ref")]
    pub token_ref: String,

    #[serde(default = "default_github_api")]
    pub api_url: String,

    #[serde(default = "default_release_name")]
    pub release_name: String,

    #[serde(default)]
    pub draft: bool,
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            release: false,
            token_ref: default_github_token_ref(),
            api_url: default_github_api(),
            release_name: default_release_name(),
            draft: false,
        }
    }
}

fn default_gitlab_token_ref() -> String {
    "GITLAB_TOKEN".to_string()
}

fn default_gitlab_api() -> String {
    "https://gitlab.com/api/v4".to_string()
}

/// GitLab release settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitlabConfig {
    #[serde(default)]
    pub release: bool,

    #[serde(default = "default_gitlab_token_ref")]
    pub token_ref: String,

    #[serde(default = "default_gitlab_api")]
    pub api_url: String,

    #[serde(default = "default_release_name")]
    pub release_name: String,
}

impl Default for GitlabConfig {
    fn default() -> Self {
        GitlabConfig {
            release: false,
            token_ref: default_gitlab_token_ref(),
            api_url: default_gitlab_api(),
            release_name: default_release_name(),
        }
    }
}

/// Loads configuration the way the binary does, using the process environment.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter (missing file is an error)
/// 2. `.release-flow.toml`, `release-flow.toml`, `.config/release-flow.toml`
/// 3. The `release-flow` field of `package.json`
/// 4. `<config dir>/release-flow/config.toml`
/// 5. Default configuration if no file found
pub fn load_config(cwd: &Path, config_path: Option<&Path>) -> crate::Result<Config> {
    Resolver::from_process(cwd).load(config_path)
}
