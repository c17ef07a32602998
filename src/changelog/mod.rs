//! Changelog assembly from commit subject lines.
//!
//! The built-in algorithm filters by conventional-commit type and renders
//! either a flat list or one section per type. A configured external
//! command replaces it entirely.

pub mod command;
pub mod date;
pub mod entry;

pub use command::run_changelog_command;
pub use date::format_date;
pub use entry::{prepend_entry, render_entry};

use crate::config::ChangelogConfig;
use crate::domain::ParsedCommit;
use tracing::debug;

/// Section heading for unclassified commits
pub const OTHER_HEADING: &str = "Other Changes";

/// Human-readable section heading for a commit type
pub fn heading_for(kind: &str) -> String {
    let known = match kind {
        "feat" => Some("Features"),
        "fix" => Some("Bug Fixes"),
        "docs" => Some("Documentation"),
        "style" => Some("Styles"),
        "refactor" => Some("Code Refactoring"),
        "perf" => Some("Performance Improvements"),
        "test" => Some("Tests"),
        "build" => Some("Build System"),
        "ci" => Some("Continuous Integration"),
        "chore" => Some("Chores"),
        "revert" => Some("Reverts"),
        _ => None,
    };
    match known {
        Some(heading) => heading.to_string(),
        None => capitalize(kind),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Filtering and grouping options of the built-in algorithm
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogAssembler {
    /// Allowed types; empty allows every type
    pub include_types: Vec<String>,
    pub group_by_type: bool,
}

impl ChangelogAssembler {
    pub fn from_config(config: &ChangelogConfig) -> Self {
        ChangelogAssembler {
            include_types: config.include_types.clone(),
            group_by_type: config.group_by_type,
        }
    }

    fn is_included(&self, commit: &ParsedCommit) -> bool {
        // Unclassified lines are never filtered out
        if self.include_types.is_empty() || !commit.is_classified() {
            return true;
        }
        self.include_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(commit.type_or_other()))
    }

    /// Render the changelog fragment for a list of commit subjects
    pub fn assemble(&self, subjects: &[String]) -> String {
        let commits: Vec<ParsedCommit> = subjects
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| ParsedCommit::parse(s))
            .filter(|c| self.is_included(c))
            .collect();
        debug!(total = subjects.len(), kept = commits.len(), "assembling changelog");

        if self.group_by_type {
            self.grouped(&commits)
        } else {
            commits
                .iter()
                .map(|c| format!("- {}", c.subject))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }

    fn grouped(&self, commits: &[ParsedCommit]) -> String {
        // Sections in first-seen order
        let mut sections: Vec<(String, Vec<String>)> = Vec::new();
        for commit in commits {
            let heading = match commit.r#type.as_deref() {
                Some(kind) => heading_for(kind),
                None => OTHER_HEADING.to_string(),
            };
            let line = match (&commit.r#type, &commit.scope) {
                (Some(_), Some(scope)) => format!("- **{}:** {}", scope, commit.description),
                (Some(_), _) => format!("- {}", commit.description),
                (None, _) => format!("- {}", commit.subject),
            };

            match sections.iter_mut().find(|(h, _)| *h == heading) {
                Some((_, lines)) => lines.push(line),
                None => sections.push((heading, vec![line])),
            }
        }

        sections
            .into_iter()
            .map(|(heading, lines)| format!("### {}\n\n{}", heading, lines.join("\n")))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
