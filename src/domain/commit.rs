use regex::Regex;
use std::sync::OnceLock;

/// Classification of a commit subject line.
///
/// Subjects that follow `type(scope)!: description` are classified; anything
/// else is kept verbatim with no type ("other").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub r#type: Option<String>,
    pub scope: Option<String>,
    pub description: String,
    pub is_breaking_change: bool,
    pub subject: String,
}

fn conventional_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<type>[a-zA-Z]+)(?:\((?P<scope>[^)]*)\))?(?P<bang>!?):\s*(?P<desc>.*)$")
            .expect("conventional commit pattern is valid")
    })
}

/// A `BREAKING CHANGE:` (or `BREAKING-CHANGE:`) footer line
fn is_breaking_trailer(line: &str) -> bool {
    let line = line.trim_start();
    BREAKING_TRAILERS.iter().any(|t| line.starts_with(t))
}

const BREAKING_TRAILERS: [&str; 2] = ["BREAKING CHANGE:", "BREAKING-CHANGE:"];

impl ParsedCommit {
    /// Parse a commit subject according to conventional commits
    /// Supports formats:
    /// - type(scope)!: description
    /// - type(scope): description
    /// - type!: description
    /// - type: description
    /// - non-conventional text
    pub fn parse(message: &str) -> Self {
        let subject = message.lines().next().unwrap_or_default().trim().to_string();
        let breaking_trailer = message.lines().any(is_breaking_trailer);

        if let Some(captures) = conventional_pattern().captures(&subject) {
            let r#type = captures
                .name("type")
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_default();
            let scope = captures
                .name("scope")
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty());
            let has_exclamation = captures.name("bang").map(|m| m.as_str()) == Some("!");
            let description = captures
                .name("desc")
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            return ParsedCommit {
                r#type: Some(r#type),
                scope,
                description,
                is_breaking_change: has_exclamation || breaking_trailer,
                subject,
            };
        }

        // Default: non-conventional commit
        ParsedCommit {
            r#type: None,
            scope: None,
            description: subject.clone(),
            is_breaking_change: breaking_trailer,
            subject,
        }
    }

    /// The classified type, or "other" for unmatched subjects
    pub fn type_or_other(&self) -> &str {
        self.r#type.as_deref().unwrap_or("other")
    }

    pub fn is_classified(&self) -> bool {
        self.r#type.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_scope() {
        let commit = ParsedCommit::parse("feat(auth): add login");
        assert_eq!(commit.r#type.as_deref(), Some("feat"));
        assert_eq!(commit.scope, Some("auth".to_string()));
        assert_eq!(commit.description, "add login");
        assert!(!commit.is_breaking_change);
    }

    #[test]
    fn test_parse_with_breaking_marker() {
        let commit = ParsedCommit::parse("feat(auth)!: redesign login");
        assert_eq!(commit.r#type.as_deref(), Some("feat"));
        assert!(commit.is_breaking_change);
    }

    #[test]
    fn test_parse_breaking_without_scope() {
        let commit = ParsedCommit::parse("feat!: redesign");
        assert_eq!(commit.scope, None);
        assert!(commit.is_breaking_change);
    }

    #[test]
    fn test_parse_non_conventional() {
        let commit = ParsedCommit::parse("Random commit message");
        assert_eq!(commit.r#type, None);
        assert_eq!(commit.type_or_other(), "other");
        assert_eq!(commit.description, "Random commit message");
        assert!(!commit.is_breaking_change);
    }

    #[test]
    fn test_parse_breaking_change_trailer() {
        let commit = ParsedCommit::parse("fix: something\n\nBREAKING CHANGE: desc");
        assert!(commit.is_breaking_change);
        assert_eq!(commit.subject, "fix: something");

        let hyphenated = ParsedCommit::parse("feat: x\n\nBREAKING-CHANGE: config renamed");
        assert!(hyphenated.is_breaking_change);
    }

    #[test]
    fn test_breaking_change_mentioned_in_subject_is_not_a_trailer() {
        let commit = ParsedCommit::parse("docs: explain BREAKING CHANGE policy");
        assert_eq!(commit.r#type.as_deref(), Some("docs"));
        assert!(!commit.is_breaking_change);

        let body = ParsedCommit::parse("fix: x\n\nSee the BREAKING CHANGE notes");
        assert!(!body.is_breaking_change);
    }

    #[test]
    fn test_parse_uppercase_type_is_lowercased() {
        let commit = ParsedCommit::parse("Fix: typo");
        assert_eq!(commit.r#type.as_deref(), Some("fix"));
    }

    #[test]
    fn test_parse_merge_subject_is_unclassified() {
        let commit = ParsedCommit::parse("Merge branch 'develop' into main");
        assert!(!commit.is_classified());
    }
}
