//! Release workflows: the git side of a release.
//!
//! Two closed variants share one [Workflow::execute] entry point:
//!
//! - [Workflow::Linear]: commit and tag on the current branch, then push
//! - [Workflow::Branching]: release branch, `git flow release finish`,
//!   push both integration branches and the tag
//!
//! Under dry-run every step is printed instead of performed and the
//! workflow still reports completion.

mod branching;
mod linear;

use crate::changelog::{prepend_entry, render_entry};
use crate::cli::args::InvocationOptions;
use crate::context::ReleaseContext;
use crate::error::{ReleaseError, Result};
use crate::git::VersionControl;
use crate::manifest::ManifestStore;
use crate::ui::formatter;
use std::fmt;
use tracing::{debug, info};

/// States a workflow passes through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Start,
    BranchEnsured,
    FilesUpdated,
    Committed,
    Tagged,
    Pushed,
    Finished,
    BranchesPushed,
    TagPushed,
    Done,
}

/// Which workflow runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Linear,
    Branching,
}

impl Workflow {
    pub fn from_options(options: &InvocationOptions) -> Self {
        if options.git_flow {
            Workflow::Branching
        } else {
            Workflow::Linear
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Workflow::Linear => "linear",
            Workflow::Branching => "git-flow",
        }
    }

    /// Workflow-specific preconditions, checked before any mutation
    pub fn check_preconditions(&self, repo: &dyn VersionControl) -> Result<()> {
        if *self == Workflow::Branching && !repo.flow_installed()? {
            return Err(ReleaseError::precondition(
                "git-flow is not installed (install it or pass --no-git-flow)",
            ));
        }
        Ok(())
    }

    /// Run the workflow to completion
    pub fn execute(
        &self,
        context: &ReleaseContext,
        repo: &dyn VersionControl,
        manifest: &dyn ManifestStore,
    ) -> Result<WorkflowReport> {
        let mut run = Run {
            context,
            repo,
            manifest,
            report: WorkflowReport::new(*self),
        };
        info!(workflow = self.name(), dry_run = context.dry_run(), "starting workflow");
        match self {
            Workflow::Linear => linear::execute(&mut run)?,
            Workflow::Branching => branching::execute(&mut run)?,
        }
        run.report.states.push(WorkflowState::Done);
        Ok(run.report)
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a workflow did, or would have done under dry-run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowReport {
    pub workflow: Workflow,
    pub states: Vec<WorkflowState>,
    pub steps: Vec<String>,
}

impl WorkflowReport {
    fn new(workflow: Workflow) -> Self {
        WorkflowReport {
            workflow,
            states: vec![WorkflowState::Start],
            steps: Vec::new(),
        }
    }

    pub fn final_state(&self) -> WorkflowState {
        self.states.last().copied().unwrap_or(WorkflowState::Start)
    }

    fn reach(&mut self, state: WorkflowState) {
        debug!(?state, "workflow state reached");
        self.states.push(state);
    }
}

/// One workflow execution in progress
pub(crate) struct Run<'a> {
    pub context: &'a ReleaseContext,
    pub repo: &'a dyn VersionControl,
    pub manifest: &'a dyn ManifestStore,
    pub report: WorkflowReport,
}

impl Run<'_> {
    /// Perform one action, or print it under dry-run
    fn step(&mut self, description: String, action: impl FnOnce() -> Result<()>) -> Result<()> {
        if self.context.dry_run() {
            formatter::display_dry_run(&description);
        } else {
            info!(step = %description, "workflow step");
            formatter::display_status(&description);
            action()?;
        }
        self.report.steps.push(description);
        Ok(())
    }

    fn remote(&self) -> &str {
        &self.context.config().git.remote
    }

    fn push_args(&self) -> &[String] {
        &self.context.config().git.push_args
    }

    fn version(&self) -> Result<&str> {
        self.context
            .version()
            .ok_or_else(|| ReleaseError::workflow("no version resolved"))
    }

    fn tag_name(&self) -> Result<&str> {
        self.context
            .tag_name()
            .ok_or_else(|| ReleaseError::workflow("no tag name resolved"))
    }

    /// Write the manifest version and prepend the changelog entry
    fn update_files(&mut self) -> Result<()> {
        let context = self.context;
        let manifest = self.manifest;
        let version = self.version()?.to_string();

        if context.options().no_increment {
            debug!("--no-increment: manifest left untouched");
        } else if manifest.read(context.cwd())?.is_some() {
            self.step(format!("write version {} to the manifest", version), || {
                manifest.write_version(context.cwd(), &version)
            })?;
        }

        let changelog = &context.config().changelog;
        if changelog.enabled {
            let path = context.cwd().join(&changelog.file);
            let entry = render_entry(
                &changelog.template,
                &context.variables(),
                context.changelog().unwrap_or_default(),
            );
            self.step(format!("prepend changelog entry to {}", path.display()), || {
                prepend_entry(&path, &entry)
            })?;
        }

        self.report.reach(WorkflowState::FilesUpdated);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let repo = self.repo;
        let message = self.context.render(&self.context.config().git.commit_message);
        self.step(format!("commit \"{}\"", message), || {
            repo.stage_all()?;
            repo.commit(&message)
        })?;
        self.report.reach(WorkflowState::Committed);
        Ok(())
    }

    fn tag_message(&self) -> String {
        self.context.render(&self.context.config().tag.annotation)
    }
}

/// Delete a same-named local and remote tag so a version can be released again
pub fn remove_existing_tag(context: &ReleaseContext, repo: &dyn VersionControl) -> Result<()> {
    if !context.config().tag.remove_existing {
        return Ok(());
    }
    let tag = context
        .tag_name()
        .ok_or_else(|| ReleaseError::workflow("no tag name resolved"))?;
    let remote = &context.config().git.remote;

    if repo.tag_exists_locally(tag)? {
        if context.dry_run() {
            formatter::display_dry_run(&format!("delete local tag {}", tag));
        } else {
            info!(tag, "deleting existing local tag");
            repo.delete_local_tag(tag)?;
        }
    }
    if repo.tag_exists_remotely(remote, tag)? {
        if context.dry_run() {
            formatter::display_dry_run(&format!("delete tag {} from {}", tag, remote));
        } else {
            info!(tag, remote = %remote, "deleting existing remote tag");
            repo.delete_remote_tag(remote, tag)?;
        }
    }
    Ok(())
}
