use crate::error::{ReleaseError, Result};
use crate::git::{PushOutcome, VersionControl};
use std::sync::{Mutex, MutexGuard};

/// A mutating or network operation observed by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    StageAll,
    Commit(String),
    CreateTag { name: String, message: String },
    PushBranch { remote: String, branch: String, args: Vec<String> },
    PushTag { remote: String, tag: String, args: Vec<String> },
    DeleteLocalTag(String),
    DeleteRemoteTag { remote: String, tag: String },
    Checkout { branch: String, start_point: Option<String> },
    PullRebase { remote: String, branch: String },
    Fetch(String),
    ResetBranch { remote: String, branch: String },
    FlowFinish { version: String, tag: String, message: String },
}

#[derive(Debug)]
struct State {
    branch: String,
    branches: Vec<String>,
    commits: Vec<String>,
    local_tags: Vec<String>,
    remote_tags: Vec<String>,
    remote_url: Option<String>,
    dirty: bool,
    remote_reachable: bool,
    flow_installed: bool,
    push_rejections: usize,
    calls: Vec<RecordedCall>,
}

/// In-memory repository for testing without real git operations.
///
/// Every write is recorded in order; queries answer from the configured state.
#[derive(Debug)]
pub struct MockRepository {
    state: Mutex<State>,
}

impl MockRepository {
    /// A clean repository on `main` with `main` and `develop` branches
    pub fn new() -> Self {
        MockRepository {
            state: Mutex::new(State {
                branch: "main".to_string(),
                branches: vec!["main".to_string(), "develop".to_string()],
                commits: Vec::new(),
                local_tags: Vec::new(),
                remote_tags: Vec::new(),
                remote_url: Some("git@github.com:acme/widget.git".to_string()),
                dirty: false,
                remote_reachable: true,
                flow_installed: true,
                push_rejections: 0,
                calls: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Commit subjects since the latest tag, oldest first
    pub fn with_commits(self, subjects: &[&str]) -> Self {
        self.state().commits = subjects.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Check out a branch, adding it if unknown
    pub fn on_branch(self, branch: &str) -> Self {
        {
            let mut state = self.state();
            state.branch = branch.to_string();
            if !state.branches.iter().any(|b| b == branch) {
                state.branches.push(branch.to_string());
            }
        }
        self
    }

    /// Add a local tag; the last one added is the latest
    pub fn with_tag(self, tag: &str) -> Self {
        self.state().local_tags.push(tag.to_string());
        self
    }

    pub fn with_remote_tag(self, tag: &str) -> Self {
        self.state().remote_tags.push(tag.to_string());
        self
    }

    pub fn with_remote_url(self, url: Option<&str>) -> Self {
        self.state().remote_url = url.map(str::to_string);
        self
    }

    pub fn dirty(self) -> Self {
        self.state().dirty = true;
        self
    }

    pub fn unreachable_remote(self) -> Self {
        self.state().remote_reachable = false;
        self
    }

    pub fn without_flow(self) -> Self {
        self.state().flow_installed = false;
        self
    }

    /// Reject the next `count` branch pushes as non-fast-forward
    pub fn reject_pushes(self, count: usize) -> Self {
        self.state().push_rejections = count;
        self
    }

    /// Recorded writes in call order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    pub fn local_tags(&self) -> Vec<String> {
        self.state().local_tags.clone()
    }

    pub fn remote_tags(&self) -> Vec<String> {
        self.state().remote_tags.clone()
    }

    fn record(&self, call: RecordedCall) {
        self.state().calls.push(call);
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionControl for MockRepository {
    fn current_branch(&self) -> Result<String> {
        Ok(self.state().branch.clone())
    }

    fn latest_tag(&self) -> Result<Option<String>> {
        Ok(self.state().local_tags.last().cloned())
    }

    fn commits_since(&self, _reference: Option<&str>) -> Result<Vec<String>> {
        Ok(self.state().commits.clone())
    }

    fn ensure_clean_working_tree(&self) -> Result<()> {
        if self.state().dirty {
            return Err(ReleaseError::precondition(
                "Working tree has uncommitted changes",
            ));
        }
        Ok(())
    }

    fn ensure_remote_reachable(&self, remote: &str) -> Result<()> {
        if !self.state().remote_reachable {
            return Err(ReleaseError::precondition(format!(
                "Remote '{}' is not reachable",
                remote
            )));
        }
        Ok(())
    }

    fn remote_url(&self, _remote: &str) -> Result<Option<String>> {
        Ok(self.state().remote_url.clone())
    }

    fn stage_all(&self) -> Result<()> {
        self.record(RecordedCall::StageAll);
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.record(RecordedCall::Commit(message.to_string()));
        Ok(())
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        let mut state = self.state();
        if state.local_tags.iter().any(|t| t == name) {
            return Err(ReleaseError::workflow(format!("Tag '{}' already exists", name)));
        }
        state.local_tags.push(name.to_string());
        state.calls.push(RecordedCall::CreateTag {
            name: name.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str, extra_args: &[String]) -> Result<PushOutcome> {
        let mut state = self.state();
        state.calls.push(RecordedCall::PushBranch {
            remote: remote.to_string(),
            branch: branch.to_string(),
            args: extra_args.to_vec(),
        });
        if state.push_rejections > 0 {
            state.push_rejections -= 1;
            return Ok(PushOutcome::Rejected(format!(
                "! [rejected] {} -> {} (non-fast-forward)",
                branch, branch
            )));
        }
        Ok(PushOutcome::Pushed)
    }

    fn push_tag(&self, remote: &str, tag: &str, extra_args: &[String]) -> Result<()> {
        let mut state = self.state();
        state.remote_tags.push(tag.to_string());
        state.calls.push(RecordedCall::PushTag {
            remote: remote.to_string(),
            tag: tag.to_string(),
            args: extra_args.to_vec(),
        });
        Ok(())
    }

    fn tag_exists_locally(&self, tag: &str) -> Result<bool> {
        Ok(self.state().local_tags.iter().any(|t| t == tag))
    }

    fn tag_exists_remotely(&self, _remote: &str, tag: &str) -> Result<bool> {
        Ok(self.state().remote_tags.iter().any(|t| t == tag))
    }

    fn delete_local_tag(&self, tag: &str) -> Result<()> {
        let mut state = self.state();
        state.local_tags.retain(|t| t != tag);
        state.calls.push(RecordedCall::DeleteLocalTag(tag.to_string()));
        Ok(())
    }

    fn delete_remote_tag(&self, remote: &str, tag: &str) -> Result<()> {
        let mut state = self.state();
        state.remote_tags.retain(|t| t != tag);
        state.calls.push(RecordedCall::DeleteRemoteTag {
            remote: remote.to_string(),
            tag: tag.to_string(),
        });
        Ok(())
    }

    fn branch_exists(&self, branch: &str) -> Result<bool> {
        Ok(self.state().branches.iter().any(|b| b == branch))
    }

    fn checkout(&self, branch: &str, start_point: Option<&str>) -> Result<()> {
        let mut state = self.state();
        if start_point.is_none() && !state.branches.iter().any(|b| b == branch) {
            return Err(ReleaseError::workflow(format!("Branch '{}' not found", branch)));
        }
        if !state.branches.iter().any(|b| b == branch) {
            state.branches.push(branch.to_string());
        }
        state.branch = branch.to_string();
        state.calls.push(RecordedCall::Checkout {
            branch: branch.to_string(),
            start_point: start_point.map(str::to_string),
        });
        Ok(())
    }

    fn pull_rebase(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(RecordedCall::PullRebase {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        self.record(RecordedCall::Fetch(remote.to_string()));
        Ok(())
    }

    fn reset_branch_to_remote(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(RecordedCall::ResetBranch {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }

    fn flow_installed(&self) -> Result<bool> {
        Ok(self.state().flow_installed)
    }

    fn flow_release_finish(&self, version: &str, tag: &str, tag_message: &str) -> Result<()> {
        let mut state = self.state();
        state.local_tags.push(tag.to_string());
        state.calls.push(RecordedCall::FlowFinish {
            version: version.to_string(),
            tag: tag.to_string(),
            message: tag_message.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_defaults() {
        let repo = MockRepository::new();
        assert_eq!(repo.current_branch().unwrap(), "main");
        assert_eq!(repo.latest_tag().unwrap(), None);
        assert!(repo.ensure_clean_working_tree().is_ok());
        assert!(repo.calls().is_empty());
    }

    #[test]
    fn test_mock_repository_tags() {
        let repo = MockRepository::new().with_tag("v1.0.0").with_tag("v1.1.0");
        assert_eq!(repo.latest_tag().unwrap(), Some("v1.1.0".to_string()));
        assert!(repo.tag_exists_locally("v1.0.0").unwrap());
        assert!(!repo.tag_exists_remotely("origin", "v1.0.0").unwrap());

        assert!(repo.create_annotated_tag("v1.1.0", "dup").is_err());
        repo.create_annotated_tag("v1.2.0", "Release 1.2.0").unwrap();
        assert_eq!(repo.latest_tag().unwrap(), Some("v1.2.0".to_string()));
    }

    #[test]
    fn test_mock_push_rejections_are_consumed() {
        let repo = MockRepository::new().reject_pushes(1);
        assert!(matches!(
            repo.push_branch("origin", "main", &[]).unwrap(),
            PushOutcome::Rejected(_)
        ));
        assert_eq!(repo.push_branch("origin", "main", &[]).unwrap(), PushOutcome::Pushed);
        assert_eq!(repo.calls().len(), 2);
    }

    #[test]
    fn test_mock_checkout_creates_branch() {
        let repo = MockRepository::new();
        assert!(repo.checkout("release/1.0.0", None).is_err());
        repo.checkout("release/1.0.0", Some("develop")).unwrap();
        assert_eq!(repo.current_branch().unwrap(), "release/1.0.0");
        assert!(repo.branch_exists("release/1.0.0").unwrap());
    }

    #[test]
    fn test_mock_failures() {
        let repo = MockRepository::new().dirty().unreachable_remote();
        assert!(repo.ensure_clean_working_tree().is_err());
        assert!(repo.ensure_remote_reachable("origin").is_err());
    }
}
