use super::{Run, WorkflowState};
use crate::error::{ReleaseError, Result};
use crate::git::PushOutcome;

/// Start → FilesUpdated → Committed → Tagged → Pushed → Done
pub(super) fn execute(run: &mut Run<'_>) -> Result<()> {
    run.update_files()?;
    run.commit()?;

    let repo = run.repo;
    let tag = run.tag_name()?.to_string();
    let message = run.tag_message();
    run.step(format!("create tag {}", tag), || {
        repo.create_annotated_tag(&tag, &message)
    })?;
    run.report.reach(WorkflowState::Tagged);

    let remote = run.remote().to_string();
    let args = run.push_args().to_vec();
    let branch = match run.context.branch() {
        Some(branch) => branch.to_string(),
        None => repo.current_branch()?,
    };
    run.step(format!("push {} to {}", branch, remote), || {
        match repo.push_branch(&remote, &branch, &args)? {
            PushOutcome::Pushed => Ok(()),
            PushOutcome::Rejected(reason) => Err(ReleaseError::workflow(format!(
                "Push of {} rejected: {}",
                branch,
                reason.trim()
            ))),
        }
    })?;
    run.step(format!("push tag {} to {}", tag, remote), || {
        repo.push_tag(&remote, &tag, &args)
    })?;
    run.report.reach(WorkflowState::Pushed);
    Ok(())
}
