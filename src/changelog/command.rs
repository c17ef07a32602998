use crate::error::{ReleaseError, Result};
use crate::hooks::shell_command;
use crate::template::{render, Variables};
use std::path::Path;
use tracing::debug;

/// Run the configured changelog command and return its trimmed stdout.
///
/// The command is rendered against the context variables plus `from` and
/// `to` (the range endpoints: latest tag, `HEAD`).
pub fn run_changelog_command(
    template: &str,
    vars: &Variables,
    from: Option<&str>,
    cwd: &Path,
) -> Result<String> {
    let mut vars = vars.clone();
    vars.insert("from".to_string(), from.unwrap_or_default().to_string());
    vars.insert("to".to_string(), "HEAD".to_string());
    let command = render(template, &vars);
    debug!(command = %command, "running changelog command");

    let output = shell_command(&command)
        .current_dir(cwd)
        .output()
        .map_err(|e| ReleaseError::workflow(format!("Cannot run changelog command `{}`: {}", command, e)))?;

    if !output.status.success() {
        return Err(ReleaseError::workflow(format!(
            "Changelog command `{}` failed: {}",
            command,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
