use crate::context::ReleaseContext;
use crate::error::{ReleaseError, Result};
use crate::hooks::lifecycle::{to_env_vars, Phase};
use crate::ui::formatter;
use std::process::Command;
use tracing::{debug, info, instrument};

/// A platform shell invocation of `command`
pub fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

/// Runs configured hook commands
pub struct HookExecutor;

impl HookExecutor {
    /// Run every hook command of a phase, strictly in order.
    ///
    /// Commands are rendered against the context variables and receive them
    /// as `RELEASE_FLOW_*` environment variables. Under dry-run each command
    /// is printed instead of executed. The first failing command aborts with
    /// [ReleaseError::Extension].
    #[instrument(skip(commands, context), fields(count = commands.len()))]
    pub fn run(phase: Phase, commands: &[String], context: &ReleaseContext) -> Result<()> {
        if commands.is_empty() {
            return Ok(());
        }

        let vars = context.variables();
        let env = to_env_vars(&vars, phase);

        for template in commands {
            let command = crate::template::render(template, &vars);

            if context.dry_run() {
                formatter::display_dry_run(&format!("{} hook: {}", phase, command));
                continue;
            }

            info!(%phase, command = %command, "running hook");
            formatter::display_status(&format!("{} hook: {}", phase, command));
            let status = shell_command(&command)
                .current_dir(context.cwd())
                .envs(&env)
                .status()
                .map_err(|e| ReleaseError::extension(&command, e.to_string()))?;

            if !status.success() {
                let code = status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                return Err(ReleaseError::extension(
                    &command,
                    format!("exited with status {}", code),
                ));
            }
            debug!(command = %command, "hook succeeded");
        }

        Ok(())
    }
}
