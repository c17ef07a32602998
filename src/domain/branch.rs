use crate::config::BranchesConfig;

/// Branch names used by the branching-model workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchModel {
    pub main: String,
    pub develop: String,
    pub release_prefix: String,
}

impl BranchModel {
    pub fn from_config(config: &BranchesConfig) -> Self {
        BranchModel {
            main: config.main.clone(),
            develop: config.develop.clone(),
            release_prefix: config.release_prefix.clone(),
        }
    }

    /// Release branch for a version (e.g. "release/1.2.0")
    pub fn release_branch(&self, version: &str) -> String {
        format!("{}{}", self.release_prefix, version)
    }

    /// The two long-lived integration branches, main first
    pub fn integration_branches(&self) -> [&str; 2] {
        [self.main.as_str(), self.develop.as_str()]
    }
}

/// Check the current branch against an allow-list; an empty list allows any branch.
pub fn is_release_allowed(current: &str, allowed: &[String]) -> bool {
    allowed.is_empty() || allowed.iter().any(|b| b == current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> BranchModel {
        BranchModel::from_config(&BranchesConfig::default())
    }

    #[test]
    fn test_release_branch_name() {
        assert_eq!(model().release_branch("1.2.0"), "release/1.2.0");
    }

    #[test]
    fn test_integration_branches_order() {
        assert_eq!(model().integration_branches(), ["main", "develop"]);
    }

    #[test]
    fn test_release_allowed() {
        assert!(is_release_allowed("feature/x", &[]));
        let allowed = vec!["main".to_string(), "develop".to_string()];
        assert!(is_release_allowed("develop", &allowed));
        assert!(!is_release_allowed("feature/x", &allowed));
    }
}
