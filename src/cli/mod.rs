//! Command-line entry: argument parsing, option resolution and the
//! orchestration of one release.

pub mod args;
pub mod orchestration;

pub use args::{Args, InvocationOptions};
pub use orchestration::{Orchestrator, ReleaseSummary, RunOutcome};

use crate::config::Resolver;
use crate::context::ReleaseContext;
use crate::error::Result;
use crate::git::Git2Repository;
use crate::manifest::PackageJson;
use crate::plugins::PluginRegistry;
use crate::publish::Publisher;
use crate::ui::{formatter, DialoguerPrompter};
use std::path::Path;
use tracing::debug;

/// Run a release in `cwd` with the real collaborators: the git repository,
/// `package.json`, terminal prompts, built-in plugins and the process
/// environment.
pub async fn run(cwd: &Path, args: &Args) -> Result<RunOutcome> {
    let resolved = Resolver::from_process(cwd).resolve(args)?;
    for warning in &resolved.warnings {
        formatter::display_boundary_warning(warning);
    }
    if let Some(origin) = &resolved.origin {
        debug!(origin = %origin.display(), "configuration loaded");
    }

    let repo = Git2Repository::open(cwd)?;
    let plugins = PluginRegistry::with_builtins().load(&resolved.config.plugins);
    let publisher = Publisher::from_process(&resolved.config);
    let context = ReleaseContext::new(cwd, resolved.config, resolved.options);

    Orchestrator::new(&repo, &PackageJson, &DialoguerPrompter)
        .with_plugins(plugins)
        .with_publisher(publisher)
        .run(&context)
        .await
}

/// Report how a run ended and return the process exit status.
///
/// Success, cancellation and info-only output exit with 0, as do errors that
/// only degrade a release (publication). Any other error exits with 1.
pub fn report(result: &Result<RunOutcome>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) if !e.is_fatal() => {
            formatter::display_warning(&e.to_string());
            0
        }
        Err(e) => {
            formatter::display_error(&e.to_string());
            1
        }
    }
}
