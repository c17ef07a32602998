use crate::domain::{BumpKind, ParsedCommit};
use tracing::debug;

/// Analyzes commit subjects to suggest a version bump
#[derive(Debug, Clone, Default)]
pub struct BumpAnalyzer {
    /// Types that count as features (minor)
    feature_types: Vec<String>,
    /// Types that count as fixes (patch)
    fix_types: Vec<String>,
}

impl BumpAnalyzer {
    /// Create an analyzer with the conventional `feat`/`fix` classes
    pub fn new() -> Self {
        BumpAnalyzer {
            feature_types: vec!["feat".to_string()],
            fix_types: vec!["fix".to_string()],
        }
    }

    /// Analyze commit subjects and suggest a bump, or `None` when nothing warrants one.
    ///
    /// Classification is unordered: a breaking change anywhere outranks a
    /// feature anywhere, which outranks a fix anywhere.
    pub fn analyze_messages(&self, messages: &[String]) -> Option<BumpKind> {
        let mut has_features = false;
        let mut has_fixes = false;

        for message in messages {
            let parsed = ParsedCommit::parse(message);

            if parsed.is_breaking_change {
                debug!(subject = %parsed.subject, "breaking change detected");
                return Some(BumpKind::Major);
            }

            if let Some(kind) = parsed.r#type.as_deref() {
                if self.feature_types.iter().any(|t| t == kind) {
                    has_features = true;
                } else if self.fix_types.iter().any(|t| t == kind) {
                    has_fixes = true;
                }
            }
        }

        if has_features {
            Some(BumpKind::Minor)
        } else if has_fixes {
            Some(BumpKind::Patch)
        } else {
            None
        }
    }
}

/// Suggest a bump kind from commit subjects using the conventional classes.
pub fn suggest_bump(messages: &[String]) -> Option<BumpKind> {
    BumpAnalyzer::new().analyze_messages(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subjects(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_suggest_patch() {
        assert_eq!(suggest_bump(&subjects(&["fix: x"])), Some(BumpKind::Patch));
    }

    #[test]
    fn test_suggest_minor() {
        assert_eq!(
            suggest_bump(&subjects(&["feat: y", "fix: x"])),
            Some(BumpKind::Minor)
        );
    }

    #[test]
    fn test_suggest_major() {
        assert_eq!(suggest_bump(&subjects(&["feat!: z"])), Some(BumpKind::Major));
        assert_eq!(
            suggest_bump(&subjects(&["fix: a", "chore: b\n\nBREAKING CHANGE: c"])),
            Some(BumpKind::Major)
        );
        assert_eq!(
            suggest_bump(&subjects(&["docs: explain BREAKING CHANGE policy"])),
            None
        );
    }

    #[test]
    fn test_suggest_none() {
        assert_eq!(suggest_bump(&subjects(&["chore: w"])), None);
        assert_eq!(suggest_bump(&[]), None);
    }

    #[test]
    fn test_order_does_not_matter() {
        let forward = subjects(&["fix: a", "docs: b", "feat(api): c"]);
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(suggest_bump(&forward), suggest_bump(&backward));
        assert_eq!(suggest_bump(&forward), Some(BumpKind::Minor));
    }
}
