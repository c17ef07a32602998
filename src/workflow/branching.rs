use super::{Run, WorkflowState};
use crate::domain::BranchModel;
use crate::error::{ReleaseError, Result};
use crate::git::{PushOutcome, VersionControl};
use crate::ui::formatter;
use tracing::{info, warn};

/// Start → BranchEnsured → FilesUpdated → Committed → Pushed → Finished
/// → BranchesPushed → TagPushed → Done
pub(super) fn execute(run: &mut Run<'_>) -> Result<()> {
    let repo = run.repo;
    let model = BranchModel::from_config(&run.context.config().branches);
    let remote = run.remote().to_string();
    let args = run.push_args().to_vec();
    let version = run.version()?.to_string();
    let tag = run.tag_name()?.to_string();

    if run.context.config().branches.sync {
        sync_integration_branches(run, &model, &remote)?;
    }

    let release_branch = model.release_branch(&version);
    if repo.branch_exists(&release_branch)? {
        run.step(format!("switch to {}", release_branch), || {
            repo.checkout(&release_branch, None)
        })?;
    } else {
        run.step(
            format!("create {} from {}", release_branch, model.develop),
            || repo.checkout(&release_branch, Some(&model.develop)),
        )?;
    }
    run.report.reach(WorkflowState::BranchEnsured);

    run.update_files()?;
    run.commit()?;

    run.step(format!("push {} to {}", release_branch, remote), || {
        push_with_rebase_retry(repo, &remote, &release_branch, &args)
    })?;
    run.report.reach(WorkflowState::Pushed);

    let message = run.tag_message();
    run.step(format!("git flow release finish {} (tag {})", version, tag), || {
        repo.flow_release_finish(&version, &tag, &message)
    })?;
    run.report.reach(WorkflowState::Finished);

    for branch in model.integration_branches() {
        run.step(format!("push {} to {}", branch, remote), || {
            match repo.push_branch(&remote, branch, &args)? {
                PushOutcome::Pushed => Ok(()),
                PushOutcome::Rejected(reason) => Err(ReleaseError::workflow(format!(
                    "Push of {} rejected: {}",
                    branch,
                    reason.trim()
                ))),
            }
        })?;
    }
    run.report.reach(WorkflowState::BranchesPushed);

    // The finish step creates the tag; under dry-run it was never created.
    if run.context.dry_run() || repo.tag_exists_locally(&tag)? {
        run.step(format!("push tag {} to {}", tag, remote), || {
            repo.push_tag(&remote, &tag, &args)
        })?;
    } else {
        info!(tag = %tag, "tag not found locally, skipping tag push");
        formatter::display_status(&format!("Tag {} not found locally, skipping push", tag));
    }
    run.report.reach(WorkflowState::TagPushed);
    Ok(())
}

/// Push a branch; on a non-fast-forward rejection rebase once and retry
fn push_with_rebase_retry(
    repo: &dyn VersionControl,
    remote: &str,
    branch: &str,
    args: &[String],
) -> Result<()> {
    match repo.push_branch(remote, branch, args)? {
        PushOutcome::Pushed => return Ok(()),
        PushOutcome::Rejected(reason) => {
            warn!(branch, reason = %reason.trim(), "push rejected, rebasing onto remote");
        }
    }

    repo.pull_rebase(remote, branch)?;
    match repo.push_branch(remote, branch, args)? {
        PushOutcome::Pushed => Ok(()),
        PushOutcome::Rejected(reason) => Err(ReleaseError::workflow(format!(
            "Push after rebase failed: {}",
            reason.trim()
        ))),
    }
}

/// Fast-forward local main/develop to the remote, except the checked-out one
fn sync_integration_branches(run: &mut Run<'_>, model: &BranchModel, remote: &str) -> Result<()> {
    let repo = run.repo;
    run.step(format!("fetch {}", remote), || repo.fetch(remote))?;

    let current = repo.current_branch()?;
    for branch in model.integration_branches() {
        if branch == current {
            info!(branch, "skipping sync of the checked-out branch");
            continue;
        }
        run.step(format!("reset {} to {}/{}", branch, remote, branch), || {
            repo.reset_branch_to_remote(remote, branch)
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::args::InvocationOptions;
    use crate::config::Config;
    use crate::context::ReleaseContext;
    use crate::error::ReleaseError;
    use crate::git::{MockRepository, RecordedCall};
    use crate::manifest::PackageJson;
    use crate::workflow::{Workflow, WorkflowState};
    use tempfile::TempDir;

    fn context(dir: &TempDir, config: Config, dry_run: bool) -> ReleaseContext {
        let options = InvocationOptions {
            dry_run,
            git_flow: true,
            ..InvocationOptions::default()
        };
        let ctx = ReleaseContext::new(dir.path(), config, options);
        ctx.set_version("1.1.0").unwrap();
        ctx.set_tag_name("v1.1.0").unwrap();
        ctx.set_changelog("- fix: a bug").unwrap();
        ctx
    }

    fn no_changelog() -> Config {
        let mut config = Config::default();
        config.changelog.enabled = false;
        config
    }

    fn pushes(repo: &MockRepository) -> Vec<String> {
        repo.calls()
            .into_iter()
            .filter_map(|call| match call {
                RecordedCall::PushBranch { branch, .. } => Some(branch),
                RecordedCall::PushTag { tag, .. } => Some(format!("tag:{}", tag)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_branching_workflow() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, no_changelog(), false);
        let repo = MockRepository::new().on_branch("develop");

        let report = Workflow::Branching.execute(&ctx, &repo, &PackageJson).unwrap();
        assert_eq!(
            report.states,
            vec![
                WorkflowState::Start,
                WorkflowState::BranchEnsured,
                WorkflowState::FilesUpdated,
                WorkflowState::Committed,
                WorkflowState::Pushed,
                WorkflowState::Finished,
                WorkflowState::BranchesPushed,
                WorkflowState::TagPushed,
                WorkflowState::Done,
            ]
        );

        let calls = repo.calls();
        assert_eq!(
            calls[0],
            RecordedCall::Checkout {
                branch: "release/1.1.0".into(),
                start_point: Some("develop".into())
            }
        );
        assert!(calls.contains(&RecordedCall::FlowFinish {
            version: "1.1.0".into(),
            tag: "v1.1.0".into(),
            message: "Release 1.1.0".into()
        }));
        assert_eq!(pushes(&repo), vec!["release/1.1.0", "main", "develop", "tag:v1.1.0"]);
    }

    #[test]
    fn test_existing_release_branch_is_reused() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, no_changelog(), false);
        let repo = MockRepository::new().on_branch("release/1.1.0");

        Workflow::Branching.execute(&ctx, &repo, &PackageJson).unwrap();
        assert_eq!(
            repo.calls()[0],
            RecordedCall::Checkout {
                branch: "release/1.1.0".into(),
                start_point: None
            }
        );
    }

    #[test]
    fn test_push_retried_once_after_rebase() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, no_changelog(), false);
        let repo = MockRepository::new().reject_pushes(1);

        let report = Workflow::Branching.execute(&ctx, &repo, &PackageJson).unwrap();
        assert_eq!(report.final_state(), WorkflowState::Done);
        assert!(repo.calls().contains(&RecordedCall::PullRebase {
            remote: "origin".into(),
            branch: "release/1.1.0".into()
        }));
        assert_eq!(
            pushes(&repo),
            vec!["release/1.1.0", "release/1.1.0", "main", "develop", "tag:v1.1.0"]
        );
    }

    #[test]
    fn test_second_rejection_is_fatal() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, no_changelog(), false);
        let repo = MockRepository::new().reject_pushes(2);

        let err = Workflow::Branching.execute(&ctx, &repo, &PackageJson).unwrap_err();
        assert!(
            matches!(err, ReleaseError::Workflow(ref msg) if msg.starts_with("Push after rebase failed"))
        );
        assert!(!repo
            .calls()
            .iter()
            .any(|c| matches!(c, RecordedCall::FlowFinish { .. })));
    }

    #[test]
    fn test_sync_skips_checked_out_branch() {
        let dir = TempDir::new().unwrap();
        let mut config = no_changelog();
        config.branches.sync = true;
        let ctx = context(&dir, config, false);
        let repo = MockRepository::new().on_branch("develop");

        Workflow::Branching.execute(&ctx, &repo, &PackageJson).unwrap();
        let calls = repo.calls();
        assert_eq!(calls[0], RecordedCall::Fetch("origin".into()));
        assert_eq!(
            calls[1],
            RecordedCall::ResetBranch {
                remote: "origin".into(),
                branch: "main".into()
            }
        );
        assert!(!calls.contains(&RecordedCall::ResetBranch {
            remote: "origin".into(),
            branch: "develop".into()
        }));
    }

    #[test]
    fn test_dry_run_records_every_step() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, Config::default(), true);
        let repo = MockRepository::new();

        let report = Workflow::Branching.execute(&ctx, &repo, &PackageJson).unwrap();
        assert_eq!(report.final_state(), WorkflowState::Done);
        assert!(repo.calls().is_empty());
        assert!(!dir.path().join("CHANGELOG.md").exists());
        assert!(report.steps.iter().any(|s| s.starts_with("git flow release finish 1.1.0")));
        assert!(report.steps.iter().any(|s| s == "push tag v1.1.0 to origin"));
    }
}
