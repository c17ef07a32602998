use crate::template::Variables;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Prefix of the environment variables exported to hook commands
pub const ENV_PREFIX: &str = "RELEASE_FLOW_";

/// Extension points of a release, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    PreChecks,
    PreWorkflow,
    PostPush,
    PostBump,
    PostRelease,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::PreChecks,
        Phase::PreWorkflow,
        Phase::PostPush,
        Phase::PostBump,
        Phase::PostRelease,
    ];

    /// Get the phase name as used in configuration
    pub fn name(&self) -> &'static str {
        match self {
            Phase::PreChecks => "pre-checks",
            Phase::PreWorkflow => "pre-workflow",
            Phase::PostPush => "post-push",
            Phase::PostBump => "post-bump",
            Phase::PostRelease => "post-release",
        }
    }

    /// The only phase whose plugin callbacks are asynchronous
    pub fn is_async(&self) -> bool {
        matches!(self, Phase::PostRelease)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map template variables to `RELEASE_FLOW_*` environment variables
pub fn to_env_vars(vars: &Variables, phase: Phase) -> HashMap<String, String> {
    let mut env: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| (format!("{}{}", ENV_PREFIX, key.to_uppercase()), value.clone()))
        .collect();
    env.insert(format!("{}PHASE", ENV_PREFIX), phase.name().to_string());
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        let names: Vec<&str> = Phase::ALL.iter().map(Phase::name).collect();
        assert_eq!(
            names,
            ["pre-checks", "pre-workflow", "post-push", "post-bump", "post-release"]
        );
    }

    #[test]
    fn test_only_post_release_is_async() {
        assert_eq!(Phase::ALL.iter().filter(|p| p.is_async()).count(), 1);
        assert!(Phase::PostRelease.is_async());
    }

    #[test]
    fn test_env_vars() {
        let mut vars = Variables::new();
        vars.insert("tag_name".to_string(), "v1.2.3".to_string());
        vars.insert("release_url".to_string(), String::new());

        let env = to_env_vars(&vars, Phase::PostPush);
        assert_eq!(env.get("RELEASE_FLOW_TAG_NAME"), Some(&"v1.2.3".to_string()));
        assert_eq!(env.get("RELEASE_FLOW_RELEASE_URL"), Some(&String::new()));
        assert_eq!(env.get("RELEASE_FLOW_PHASE"), Some(&"post-push".to_string()));
        assert_eq!(env.len(), 3);
    }
}
