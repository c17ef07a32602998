//! Release orchestration
//!
//! Drives one release through its lifecycle:
//!
//! 1. pre-checks hooks and plugins
//! 2. preconditions (clean tree, reachable remote, allowed branch)
//! 3. version, changelog and release-notes resolution
//! 4. confirmation
//! 5. tag pre-removal, pre-workflow phase, workflow
//! 6. post-push and post-bump phases
//! 7. publication
//! 8. post-release hooks, then asynchronous plugin callbacks
//!
//! Info-only invocations (`--release-version`, `--changelog`) stop after
//! step 3 and never mutate anything.

use crate::analyzer::suggest_bump;
use crate::boundary::BoundaryWarning;
use crate::changelog::{date, run_changelog_command, ChangelogAssembler};
use crate::context::ReleaseContext;
use crate::domain::{is_release_allowed, next_version, normalize_preid, BumpKind, TagPattern};
use crate::error::{ReleaseError, Result};
use crate::git::{RepoCoordinates, VersionControl};
use crate::hooks::{HookExecutor, Phase};
use crate::manifest::ManifestStore;
use crate::plugins::Plugins;
use crate::publish::{PublicationSummary, Publisher};
use crate::ui::{formatter, Prompter};
use crate::workflow::{remove_existing_tag, Workflow, WorkflowReport};
use tracing::{debug, info, instrument};

/// Version used when neither a manifest nor a tag provides one
pub const INITIAL_VERSION: &str = "0.0.0";

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    Released(ReleaseSummary),
    /// An info-only flag printed this value
    Printed(String),
    /// The user declined the confirmation
    Cancelled,
}

/// Result of a completed release
#[derive(Debug)]
pub struct ReleaseSummary {
    pub version: String,
    pub tag_name: String,
    pub workflow: WorkflowReport,
    pub publication: PublicationSummary,
    pub warnings: Vec<BoundaryWarning>,
}

/// Collaborators of one release run
pub struct Orchestrator<'a> {
    repo: &'a dyn VersionControl,
    manifest: &'a dyn ManifestStore,
    prompter: &'a dyn Prompter,
    plugins: Plugins,
    publisher: Publisher,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        repo: &'a dyn VersionControl,
        manifest: &'a dyn ManifestStore,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Orchestrator {
            repo,
            manifest,
            prompter,
            plugins: Plugins::default(),
            publisher: Publisher::new(None, Vec::new(), Default::default()),
        }
    }

    pub fn with_plugins(mut self, plugins: Plugins) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_publisher(mut self, publisher: Publisher) -> Self {
        self.publisher = publisher;
        self
    }

    /// Run hooks, then plugin callbacks, of a synchronous phase
    fn phase(&self, phase: Phase, context: &ReleaseContext) -> Result<()> {
        HookExecutor::run(phase, context.config().hooks.commands(phase), context)?;
        self.plugins.run_phase(phase, context);
        Ok(())
    }

    #[instrument(skip_all, fields(cwd = %context.cwd().display(), dry_run = context.dry_run()))]
    pub async fn run(&self, context: &ReleaseContext) -> Result<RunOutcome> {
        let options = context.options();
        let workflow = Workflow::from_options(options);
        let mut warnings = Vec::new();

        if !options.is_info_only() {
            self.phase(Phase::PreChecks, context)?;
            self.check_preconditions(context, workflow)?;
        }

        self.resolve(context, &mut warnings)?;
        for warning in &warnings {
            formatter::display_boundary_warning(warning);
        }

        if options.print_release_version {
            let version = context.version().unwrap_or_default().to_string();
            println!("{}", version);
            return Ok(RunOutcome::Printed(version));
        }
        if options.print_changelog {
            let changelog = context.changelog().unwrap_or_default().to_string();
            println!("{}", changelog);
            return Ok(RunOutcome::Printed(changelog));
        }

        formatter::display_commit_analysis(context.commits(), context.branch().unwrap_or("HEAD"));
        let plan = formatter::format_release_plan(context, workflow.name());
        if !self
            .prompter
            .confirm(&plan, options.non_interactive(), options.auto_confirm())?
        {
            info!("release cancelled");
            formatter::display_status("Release cancelled");
            return Ok(RunOutcome::Cancelled);
        }

        remove_existing_tag(context, self.repo)?;
        self.phase(Phase::PreWorkflow, context)?;
        let report = workflow.execute(context, self.repo, self.manifest)?;
        self.phase(Phase::PostPush, context)?;
        self.phase(Phase::PostBump, context)?;

        let publication = self.publisher.publish(context, self.manifest).await;

        HookExecutor::run(
            Phase::PostRelease,
            context.config().hooks.commands(Phase::PostRelease),
            context,
        )?;
        self.plugins.run_post_release(context).await;

        let version = context.version().unwrap_or_default().to_string();
        let tag_name = context.tag_name().unwrap_or_default().to_string();
        if context.dry_run() {
            formatter::display_success(&format!("Dry run of {} complete, nothing was changed", tag_name));
        } else {
            formatter::display_success(&format!("Released {}", tag_name));
        }
        if let Some(url) = context.release_url() {
            formatter::display_status(&format!("Release page: {}", url));
        }

        Ok(RunOutcome::Released(ReleaseSummary {
            version,
            tag_name,
            workflow: report,
            publication,
            warnings,
        }))
    }

    fn check_preconditions(&self, context: &ReleaseContext, workflow: Workflow) -> Result<()> {
        let git = &context.config().git;
        if git.require_clean {
            self.repo.ensure_clean_working_tree()?;
        }
        if git.require_remote {
            self.repo.ensure_remote_reachable(&git.remote)?;
        }
        if !git.require_branch.is_empty() {
            let current = self.repo.current_branch()?;
            if !is_release_allowed(&current, &git.require_branch) {
                return Err(ReleaseError::precondition(format!(
                    "Releases are only allowed from {} (current branch: {})",
                    git.require_branch.join(", "),
                    current
                )));
            }
        }
        workflow.check_preconditions(self.repo)?;
        debug!("preconditions satisfied");
        Ok(())
    }

    /// Fill the release context: current and next version, commits,
    /// changelog, release notes, tag and repository coordinates
    fn resolve(&self, context: &ReleaseContext, warnings: &mut Vec<BoundaryWarning>) -> Result<()> {
        let config = context.config();
        let options = context.options();
        let tags = TagPattern::new(config.tag.prefix.clone());

        context.set_branch(self.repo.current_branch()?)?;
        let latest_tag = self.repo.latest_tag()?;
        let commits = self.repo.commits_since(latest_tag.as_deref())?;
        if let (Some(tag), true) = (&latest_tag, commits.is_empty()) {
            warnings.push(BoundaryWarning::NoNewCommits {
                latest_tag: tag.clone(),
            });
        }

        let manifest = self.manifest.read(context.cwd())?;
        let current = match manifest.as_ref().and_then(|m| m.version.clone()) {
            Some(version) => version,
            None => {
                let fallback = self.version_from_tag(&tags, latest_tag.as_deref(), warnings);
                warnings.push(BoundaryWarning::ManifestMissing {
                    fallback_version: fallback.clone(),
                });
                fallback
            }
        };
        let name = manifest
            .and_then(|m| m.name)
            .or_else(|| {
                context
                    .cwd()
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| "project".to_string());
        context.set_name(name)?;
        context.set_latest_version(current.clone())?;

        let (increment, preid, next) = if options.no_increment {
            (None, None, current.clone())
        } else {
            let suggested = if config.changelog.conventional_commits {
                suggest_bump(&commits)
            } else {
                None
            };
            let explicit = options.increment.is_some();
            let default = options.increment.or(suggested).unwrap_or(BumpKind::Patch);
            let kind = self.prompter.choose_bump_kind(
                &current,
                suggested,
                default,
                options.non_interactive() || explicit,
            )?;

            let preid = match &options.preid {
                Some(raw) => Some(raw.clone()),
                None => self
                    .prompter
                    .choose_pre_id(options.non_interactive() || explicit)?,
            };
            let preid = preid.as_deref().map(normalize_preid).transpose()?;
            let next = next_version(&current, kind, preid.as_deref())?;
            (Some(kind), preid, next)
        };
        info!(current = %current, next = %next, increment = ?increment, "version resolved");

        context.set_increment(increment)?;
        context.set_preid(preid)?;
        context.set_version(next.clone())?;
        context.set_tag_name(tags.format(&next))?;
        context.set_date(date::today(&config.changelog.date_locale))?;
        if let Some(coordinates) = self
            .repo
            .remote_url(&config.git.remote)?
            .as_deref()
            .and_then(RepoCoordinates::parse)
        {
            context.set_repository(coordinates)?;
        }

        let changelog = match &config.changelog.command {
            Some(command) => run_changelog_command(
                command,
                &context.variables(),
                latest_tag.as_deref(),
                context.cwd(),
            )?,
            None => ChangelogAssembler::from_config(&config.changelog).assemble(&commits),
        };
        context.set_commits(commits)?;
        context.set_changelog(changelog)?;
        context.set_release_notes(context.render(&config.changelog.release_notes))?;
        Ok(())
    }

    fn version_from_tag(
        &self,
        tags: &TagPattern,
        latest_tag: Option<&str>,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> String {
        let Some(tag) = latest_tag else {
            return INITIAL_VERSION.to_string();
        };
        match tags.parse_version(tag) {
            Some(version) => version.to_string(),
            None => {
                warnings.push(BoundaryWarning::UnparsableTag {
                    tag: tag.to_string(),
                    reason: format!("expected {}<version>", tags.prefix),
                });
                INITIAL_VERSION.to_string()
            }
        }
    }
}
