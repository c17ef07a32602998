//! Configuration sources: files, the manifest extension field, environment
//! variables and command-line flags, each converted to a TOML layer.

use crate::boundary::BoundaryWarning;
use crate::cli::args::Args;
use crate::config::merge::set_path;
use crate::domain::BumpKind;
use crate::error::{ReleaseError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::debug;

/// Conventional config filenames looked up in the working directory
pub const CONFIG_FILENAMES: [&str; 3] = [
    ".release-flow.toml",
    "release-flow.toml",
    ".config/release-flow.toml",
];

/// Field of `package.json` that may carry the configuration
pub const MANIFEST_FIELD: &str = "release-flow";

pub const ENV_CI: &str = "RELEASE_FLOW_CI";
pub const ENV_BUMP: &str = "RELEASE_FLOW_BUMP";
pub const ENV_DRY_RUN: &str = "RELEASE_FLOW_DRY_RUN";
pub const ENV_NO_GIT_FLOW: &str = "RELEASE_FLOW_NO_GIT_FLOW";
pub const ENV_YES: &str = "RELEASE_FLOW_YES";
pub const ENV_PREID: &str = "RELEASE_FLOW_PREID";

/// Environment variables set by common CI vendors (detection only)
pub const CI_VENDOR_VARS: [&str; 14] = [
    "CI",
    "CONTINUOUS_INTEGRATION",
    "BUILD_NUMBER",
    "RUN_ID",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "TRAVIS",
    "JENKINS_URL",
    "BUILDKITE",
    "TF_BUILD",
    "BITBUCKET_BUILD_NUMBER",
    "TEAMCITY_VERSION",
    "DRONE",
];

/// A configuration layer and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSource {
    pub origin: PathBuf,
    pub table: Table,
}

/// Outcome of looking for a project config file
#[derive(Debug, Default)]
pub struct Discovery {
    pub source: Option<ConfigSource>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Find and parse the project configuration.
///
/// An explicitly named file must exist. Otherwise the first existing
/// candidate wins; unreadable or malformed content degrades to defaults
/// with a warning.
pub fn discover(
    cwd: &Path,
    explicit: Option<&Path>,
    user_config_dir: Option<&Path>,
) -> Result<Discovery> {
    let mut discovery = Discovery::default();

    if let Some(path) = explicit {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            cwd.join(path)
        };
        if !path.is_file() {
            return Err(ReleaseError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        discovery.source = parse_file(&path, &mut discovery.warnings);
        return Ok(discovery);
    }

    for name in CONFIG_FILENAMES {
        let path = cwd.join(name);
        if path.is_file() {
            discovery.source = parse_file(&path, &mut discovery.warnings);
            return Ok(discovery);
        }
    }

    let manifest = cwd.join("package.json");
    if manifest.is_file() {
        if let Some(source) = parse_manifest_field(&manifest, &mut discovery.warnings) {
            discovery.source = Some(source);
            return Ok(discovery);
        }
    }

    if let Some(dir) = user_config_dir {
        let path = dir.join("release-flow").join("config.toml");
        if path.is_file() {
            discovery.source = parse_file(&path, &mut discovery.warnings);
        }
    }

    Ok(discovery)
}

fn parse_file(path: &Path, warnings: &mut Vec<BoundaryWarning>) -> Option<ConfigSource> {
    debug!(path = %path.display(), "reading config file");
    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| toml::from_str::<Table>(&content).map_err(|e| e.to_string()));

    match parsed {
        Ok(table) => Some(ConfigSource {
            origin: path.to_path_buf(),
            table,
        }),
        Err(reason) => {
            warnings.push(BoundaryWarning::ConfigParseFailed {
                path: path.display().to_string(),
                reason,
            });
            None
        }
    }
}

fn parse_manifest_field(
    manifest: &Path,
    warnings: &mut Vec<BoundaryWarning>,
) -> Option<ConfigSource> {
    let content = fs::read_to_string(manifest).ok()?;
    // A malformed manifest is reported by the manifest store, not here.
    let json: serde_json::Value = serde_json::from_str(&content).ok()?;
    let field = json.get(MANIFEST_FIELD)?;

    match json_to_table(field) {
        Ok(table) => Some(ConfigSource {
            origin: manifest.to_path_buf(),
            table,
        }),
        Err(reason) => {
            warnings.push(BoundaryWarning::ConfigParseFailed {
                path: format!("{}#{}", manifest.display(), MANIFEST_FIELD),
                reason,
            });
            None
        }
    }
}

fn json_to_table(value: &serde_json::Value) -> std::result::Result<Table, String> {
    if !value.is_object() {
        return Err(format!("expected an object, found {}", value));
    }
    serde_json::from_value::<Table>(value.clone()).map_err(|e| e.to_string())
}

/// Interpret an environment value as a boolean switch
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn env_flag(env: &HashMap<String, String>, key: &str) -> bool {
    env.get(key).map(|v| is_truthy(v)).unwrap_or(false)
}

/// Build the environment layer.
///
/// Boolean variables only ever switch behavior on; an unknown bump kind is
/// ignored with a debug log.
pub fn env_layer(env: &HashMap<String, String>) -> Table {
    let mut table = Table::new();

    if env_flag(env, ENV_DRY_RUN) {
        set_path(&mut table, "dry_run", Value::Boolean(true));
    }
    if env_flag(env, ENV_YES) {
        set_path(&mut table, "yes", Value::Boolean(true));
    }
    if env_flag(env, ENV_NO_GIT_FLOW) {
        set_path(&mut table, "workflow.git_flow", Value::Boolean(false));
    }
    if let Some(raw) = env.get(ENV_BUMP) {
        match raw.parse::<BumpKind>() {
            Ok(kind) => set_path(&mut table, "increment", Value::String(kind.to_string())),
            Err(e) => debug!(value = %raw, error = %e, "ignoring {}", ENV_BUMP),
        }
    }
    if let Some(preid) = env.get(ENV_PREID).filter(|p| !p.trim().is_empty()) {
        set_path(&mut table, "preid", Value::String(preid.trim().to_string()));
    }

    table
}

/// Whether the environment asks for CI mode (explicit toggle or vendor variable)
pub fn env_requests_ci(env: &HashMap<String, String>) -> bool {
    if env_flag(env, ENV_CI) {
        return true;
    }
    CI_VENDOR_VARS.iter().any(|key| match env.get(*key) {
        Some(value) => {
            let value = value.trim().to_lowercase();
            !value.is_empty() && value != "false" && value != "0"
        }
        None => false,
    })
}

/// Build the command-line layer from parsed flags
pub fn argv_layer(args: &Args) -> Table {
    let mut table = Table::new();

    if args.dry_run {
        set_path(&mut table, "dry_run", Value::Boolean(true));
    }
    if args.yes {
        set_path(&mut table, "yes", Value::Boolean(true));
    }
    if args.no_git_flow {
        set_path(&mut table, "workflow.git_flow", Value::Boolean(false));
    }
    if let Some(kind) = args.requested_bump() {
        set_path(&mut table, "increment", Value::String(kind.to_string()));
    }
    if let Some(preid) = args.preid.as_deref().filter(|p| !p.trim().is_empty()) {
        set_path(&mut table, "preid", Value::String(preid.trim().to_string()));
    }

    table
}
