//! Formatting functions for user-facing output.
//!
//! Display logic is kept apart from interaction. `format_*` functions are
//! pure and tested; `display_*` functions print.

use crate::boundary::BoundaryWarning;
use crate::context::ReleaseContext;
use console::style;

/// Print a fatal error: `Error: <message>`
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), message);
}

/// Print a success message with a green check mark
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print a status message with a yellow arrow
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a non-fatal failure; the run continues
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}

pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Print what a dry run would have done
pub fn display_dry_run(message: &str) {
    println!("{} {}", style("[dry-run]").cyan(), message);
}

/// Show the commit subjects considered for this release, at most ten
pub fn display_commit_analysis(subjects: &[String], branch: &str) {
    println!("{}", format_commit_analysis(subjects, branch));
}

pub fn format_commit_analysis(subjects: &[String], branch: &str) -> String {
    let mut out = format!(
        "{}\n",
        style(format!("Commits on '{}' since the last release: {}", branch, subjects.len())).bold()
    );
    for (i, subject) in subjects.iter().take(10).enumerate() {
        let short: String = subject.chars().take(72).collect();
        out.push_str(&format!("  {}. {}\n", i + 1, short));
    }
    if subjects.len() > 10 {
        out.push_str(&format!("  ... and {} more commits\n", subjects.len() - 10));
    }
    out.trim_end().to_string()
}

/// The release plan shown before confirmation
pub fn format_release_plan(context: &ReleaseContext, workflow: &str) -> String {
    let mut lines = Vec::new();
    let name = context.name().unwrap_or("project");
    lines.push(format!(
        "Release {} {} -> {}",
        name,
        context.latest_version().unwrap_or("?"),
        context.version().unwrap_or("?")
    ));
    if let Some(tag) = context.tag_name() {
        lines.push(format!("  Tag:       {}", tag));
    }
    if let Some(branch) = context.branch() {
        lines.push(format!("  Branch:    {}", branch));
    }
    lines.push(format!("  Workflow:  {}", workflow));
    if context.dry_run() {
        lines.push("  Mode:      dry run (no changes will be made)".to_string());
    }
    if let Some(changelog) = context.changelog().filter(|c| !c.is_empty()) {
        lines.push(String::new());
        lines.push(changelog.to_string());
    }
    lines.join("\n")
}
