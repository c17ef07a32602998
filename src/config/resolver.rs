use crate::boundary::BoundaryWarning;
use crate::cli::args::{Args, InvocationOptions};
use crate::config::merge::{get_path, merge_layers};
use crate::config::sources::{self, argv_layer, env_layer, env_requests_ci};
use crate::config::Config;
use crate::error::{ReleaseError, Result};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Resolves the layered configuration for one invocation.
///
/// Pure over its inputs: the working directory's files, an explicit
/// environment map and the parsed arguments.
#[derive(Debug, Clone)]
pub struct Resolver {
    cwd: PathBuf,
    env: HashMap<String, String>,
    user_config_dir: Option<PathBuf>,
}

/// Result of resolution, with the non-fatal warnings collected on the way
#[derive(Debug, Clone)]
pub struct Resolved {
    pub config: Config,
    pub options: InvocationOptions,
    pub origin: Option<PathBuf>,
    pub warnings: Vec<BoundaryWarning>,
}

impl Resolver {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Resolver {
            cwd: cwd.into(),
            env: HashMap::new(),
            user_config_dir: None,
        }
    }

    /// Snapshot the process environment and the user config directory
    pub fn from_process(cwd: &Path) -> Self {
        Resolver::new(cwd)
            .with_env(std::env::vars().collect())
            .with_user_config_dir(dirs::config_dir())
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_user_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.user_config_dir = dir;
        self
    }

    /// Resolve configuration and invocation options from parsed arguments
    #[instrument(skip(self, args), fields(cwd = %self.cwd.display()))]
    pub fn resolve(&self, args: &Args) -> Result<Resolved> {
        let discovery = sources::discover(
            &self.cwd,
            args.config.as_deref(),
            self.user_config_dir.as_deref(),
        )?;
        let mut warnings = discovery.warnings;

        let defaults = Config::default().to_table()?;
        let file_table = discovery
            .source
            .as_ref()
            .map(|s| s.table.clone())
            .unwrap_or_default();
        let env_table = env_layer(&self.env);
        let argv_table = argv_layer(args);

        let mut origin = discovery.source.as_ref().map(|s| s.origin.clone());
        let mut file_ci = get_path(&file_table, "ci").and_then(toml::Value::as_bool);

        let merged = merge_layers([
            defaults.clone(),
            file_table,
            env_table.clone(),
            argv_table.clone(),
        ]);
        let mut config = match Config::from_table(merged) {
            Ok(config) => config,
            Err(e) => {
                // A file with values of the wrong shape degrades to defaults.
                warnings.push(BoundaryWarning::ConfigParseFailed {
                    path: origin
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<config>".to_string()),
                    reason: e.to_string(),
                });
                origin = None;
                file_ci = None;
                Config::from_table(merge_layers([defaults, env_table, argv_table]))?
            }
        };

        config.ci = Some(self.ci_mode(args.ci, file_ci));
        let options = InvocationOptions::from_config(&config, args);
        debug!(ci = options.ci, dry_run = options.dry_run, git_flow = options.git_flow, "configuration resolved");

        for warning in &warnings {
            warn!("{}", warning);
        }

        Ok(Resolved {
            config,
            options,
            origin,
            warnings,
        })
    }

    /// Load only the configuration (no argv flags)
    pub fn load(&self, config_path: Option<&Path>) -> Result<Config> {
        let args = Args {
            config: config_path.map(Path::to_path_buf),
            ..Args::default()
        };
        Ok(self.resolve(&args)?.config)
    }

    /// CI mode: the flag always wins; an explicit `ci = false` in the file
    /// disables detection; otherwise the environment may switch it on.
    fn ci_mode(&self, flag: bool, file_ci: Option<bool>) -> bool {
        if flag {
            return true;
        }
        match file_ci {
            Some(false) => false,
            Some(true) => true,
            None => env_requests_ci(&self.env),
        }
    }
}

/// Resolve configuration from a working directory and raw argv, using the
/// process environment.
pub fn resolve<I, T>(cwd: &Path, argv: I) -> Result<(Config, InvocationOptions)>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    use clap::Parser;

    let args = Args::try_parse_from(argv).map_err(|e| ReleaseError::config(e.to_string()))?;
    let resolved = Resolver::from_process(cwd).resolve(&args)?;
    Ok((resolved.config, resolved.options))
}
