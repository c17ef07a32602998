//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Output formatting
//! - This module - The [Prompter] seam and its terminal implementation

use crate::domain::{next_version, BumpKind};
use crate::error::{ReleaseError, Result};
use dialoguer::{Confirm, Input, Select};
use std::sync::atomic::{AtomicUsize, Ordering};

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_commit_analysis, display_dry_run, display_error,
    display_status, display_success, display_warning,
};

/// Interactive decisions taken during a release.
///
/// Every method has a non-interactive answer: the default bump kind, no
/// pre-release id, and confirmation.
pub trait Prompter {
    fn choose_bump_kind(
        &self,
        current: &str,
        suggested: Option<BumpKind>,
        default: BumpKind,
        non_interactive: bool,
    ) -> Result<BumpKind>;

    fn choose_pre_id(&self, non_interactive: bool) -> Result<Option<String>>;

    fn confirm(&self, summary: &str, non_interactive: bool, auto_yes: bool) -> Result<bool>;
}

fn prompt_error(e: dialoguer::Error) -> ReleaseError {
    match e {
        dialoguer::Error::IO(io) => ReleaseError::Io(io),
    }
}

/// Terminal prompts via `dialoguer`
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn choose_bump_kind(
        &self,
        current: &str,
        suggested: Option<BumpKind>,
        default: BumpKind,
        non_interactive: bool,
    ) -> Result<BumpKind> {
        if non_interactive {
            return Ok(default);
        }

        let items: Vec<String> = BumpKind::ALL
            .iter()
            .map(|kind| {
                let next = next_version(current, *kind, None).unwrap_or_else(|_| "?".to_string());
                let marker = if Some(*kind) == suggested { " (suggested)" } else { "" };
                format!("{} ({}){}", kind, next, marker)
            })
            .collect();
        let default_index = BumpKind::ALL.iter().position(|k| *k == default).unwrap_or(0);

        let selection = Select::new()
            .with_prompt(format!("Select increment (current version {})", current))
            .items(&items)
            .default(default_index)
            .interact()
            .map_err(prompt_error)?;
        Ok(BumpKind::ALL[selection])
    }

    fn choose_pre_id(&self, non_interactive: bool) -> Result<Option<String>> {
        if non_interactive {
            return Ok(None);
        }

        let prerelease = Confirm::new()
            .with_prompt("Is this a pre-release?")
            .default(false)
            .interact()
            .map_err(prompt_error)?;
        if !prerelease {
            return Ok(None);
        }

        let id: String = Input::new()
            .with_prompt("Pre-release identifier")
            .default("beta".to_string())
            .interact_text()
            .map_err(prompt_error)?;
        Ok(Some(id))
    }

    fn confirm(&self, summary: &str, non_interactive: bool, auto_yes: bool) -> Result<bool> {
        println!("{}\n", summary);
        if non_interactive || auto_yes {
            return Ok(true);
        }

        Confirm::new()
            .with_prompt("Proceed with release?")
            .default(true)
            .interact()
            .map_err(prompt_error)
    }
}

/// Fixed answers, for scripted use and tests
#[derive(Debug, Default)]
pub struct StaticPrompter {
    /// `None` answers with the offered default
    pub bump: Option<BumpKind>,
    pub preid: Option<String>,
    pub accept: bool,
    confirmations: AtomicUsize,
}

impl StaticPrompter {
    pub fn accepting() -> Self {
        StaticPrompter {
            accept: true,
            ..StaticPrompter::default()
        }
    }

    pub fn declining() -> Self {
        StaticPrompter::default()
    }

    pub fn with_bump(mut self, kind: BumpKind) -> Self {
        self.bump = Some(kind);
        self
    }

    pub fn with_preid(mut self, preid: &str) -> Self {
        self.preid = Some(preid.to_string());
        self
    }

    /// How many times a confirmation was actually asked
    pub fn confirmations(&self) -> usize {
        self.confirmations.load(Ordering::SeqCst)
    }
}

impl Prompter for StaticPrompter {
    fn choose_bump_kind(
        &self,
        _current: &str,
        _suggested: Option<BumpKind>,
        default: BumpKind,
        non_interactive: bool,
    ) -> Result<BumpKind> {
        if non_interactive {
            return Ok(default);
        }
        Ok(self.bump.unwrap_or(default))
    }

    fn choose_pre_id(&self, non_interactive: bool) -> Result<Option<String>> {
        if non_interactive {
            return Ok(None);
        }
        Ok(self.preid.clone())
    }

    fn confirm(&self, _summary: &str, non_interactive: bool, auto_yes: bool) -> Result<bool> {
        if non_interactive || auto_yes {
            return Ok(true);
        }
        self.confirmations.fetch_add(1, Ordering::SeqCst);
        Ok(self.accept)
    }
}
