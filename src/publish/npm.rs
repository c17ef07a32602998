//! Package-registry publication through the `npm` CLI.

use crate::config::NpmConfig;
use crate::error::{ReleaseError, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Lockfiles that trigger a dependency reinstall before publishing
pub const LOCKFILES: [&str; 2] = ["package-lock.json", "npm-shrinkwrap.json"];

/// Environment variable holding the registry one-time password
pub const ENV_OTP: &str = "NPM_OTP";

/// Runs `npm install` and `npm publish`
#[derive(Debug, Clone)]
pub struct NpmPublisher {
    config: NpmConfig,
    otp: Option<String>,
    program: String,
}

impl NpmPublisher {
    pub fn new(config: NpmConfig, otp: Option<String>) -> Self {
        NpmPublisher {
            config,
            otp: otp.filter(|o| !o.is_empty()),
            program: "npm".to_string(),
        }
    }

    /// Use another executable in place of `npm`
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    pub fn enabled(&self) -> bool {
        self.config.publish
    }

    pub fn has_lockfile(dir: &Path) -> bool {
        LOCKFILES.iter().any(|f| dir.join(f).is_file())
    }

    /// Arguments of the publish command
    pub fn publish_args(&self) -> Vec<String> {
        let mut args = vec!["publish".to_string(), "--tag".to_string(), self.config.tag.clone()];
        if let Some(access) = &self.config.access {
            args.push("--access".to_string());
            args.push(access.clone());
        }
        if let Some(otp) = &self.otp {
            args.push("--otp".to_string());
            args.push(otp.clone());
        }
        args.extend(self.config.args.iter().cloned());
        args
    }

    /// The publish command as shown to the user, with the one-time password masked
    pub fn display_command(&self) -> String {
        let mut masked = Vec::new();
        let mut args = self.publish_args().into_iter();
        while let Some(arg) = args.next() {
            let is_otp = arg == "--otp";
            masked.push(arg);
            if is_otp && args.next().is_some() {
                masked.push("***".to_string());
            }
        }
        format!("{} {}", self.program, masked.join(" "))
    }

    fn run(&self, dir: &Path, args: &[String]) -> Result<()> {
        debug!(program = %self.program, ?args, "running npm");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| ReleaseError::publication(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let first = args.first().map(String::as_str).unwrap_or_default();
            return Err(ReleaseError::publication(format!(
                "{} {} failed: {}",
                self.program,
                first,
                stderr.trim()
            )));
        }
        Ok(())
    }

    /// Reinstall when a lockfile exists, then publish
    pub fn publish(&self, dir: &Path) -> Result<()> {
        if Self::has_lockfile(dir) {
            info!("lockfile found, reinstalling dependencies");
            self.run(dir, &["install".to_string()])?;
        }
        self.run(dir, &self.publish_args())?;
        info!(tag = %self.config.tag, "package published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> NpmConfig {
        NpmConfig {
            publish: true,
            access: Some("public".to_string()),
            args: vec!["--provenance".to_string()],
            ..NpmConfig::default()
        }
    }

    #[test]
    fn test_publish_args() {
        let publisher = NpmPublisher::new(config(), Some("123456".to_string()));
        assert_eq!(
            publisher.publish_args(),
            vec!["publish", "--tag", "latest", "--access", "public", "--otp", "123456", "--provenance"]
        );

        let publisher = NpmPublisher::new(NpmConfig::default(), Some(String::new()));
        assert_eq!(publisher.publish_args(), vec!["publish", "--tag", "latest"]);
    }

    #[test]
    fn test_display_command_masks_otp() {
        let publisher = NpmPublisher::new(config(), Some("123456".to_string()));
        let shown = publisher.display_command();
        assert!(!shown.contains("123456"), "got: {}", shown);
        assert_eq!(
            shown,
            "npm publish --tag latest --access public --otp *** --provenance"
        );

        let publisher = NpmPublisher::new(NpmConfig::default(), None);
        assert_eq!(publisher.display_command(), "npm publish --tag latest");
    }

    #[test]
    fn test_lockfile_detection() {
        let dir = TempDir::new().unwrap();
        assert!(!NpmPublisher::has_lockfile(dir.path()));
        std::fs::write(dir.path().join("package-lock.json"), "{}").unwrap();
        assert!(NpmPublisher::has_lockfile(dir.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_is_a_publication_error() {
        let dir = TempDir::new().unwrap();
        let publisher = NpmPublisher::new(config(), None).with_program("false");
        let err = publisher.publish(dir.path()).unwrap_err();
        assert!(matches!(err, ReleaseError::Publication(_)));
        assert!(!err.is_fatal());

        let publisher = NpmPublisher::new(config(), None).with_program("true");
        assert!(publisher.publish(dir.path()).is_ok());
    }
}
