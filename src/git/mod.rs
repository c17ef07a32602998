//! Version-control abstraction layer
//!
//! The release pipeline depends on the [VersionControl] trait only. The
//! concrete implementations are:
//!
//! - [repository::Git2Repository]: reads and local writes through the
//!   `git2` crate, network operations and `git flow` through the `git` CLI
//! - [mock::MockRepository]: an in-memory recording implementation for tests
//!
//! ```rust
//! # use release_flow::git::VersionControl;
//! # fn example<R: VersionControl>(repo: &R) -> release_flow::Result<()> {
//! let tag = repo.latest_tag()?;
//! let subjects = repo.commits_since(tag.as_deref())?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod remote;
pub mod repository;

pub use mock::{MockRepository, RecordedCall};
pub use remote::RepoCoordinates;
pub use repository::Git2Repository;

use crate::error::Result;

/// Result of pushing a ref that the remote may reject
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Pushed,
    /// The remote refused a non-fast-forward update
    Rejected(String),
}

/// Operations the release pipeline needs from version control.
///
/// ## Thread Safety
///
/// Implementors must be `Send + Sync` so a repository can be shared with
/// asynchronous plugin callbacks.
///
/// ## Error Handling
///
/// Methods return [crate::error::Result]. Failures of write operations
/// should map to [crate::error::ReleaseError::Workflow]; failed checks to
/// [crate::error::ReleaseError::Precondition].
pub trait VersionControl: Send + Sync {
    /// Name of the checked-out branch
    fn current_branch(&self) -> Result<String>;

    /// Most recent tag reachable from HEAD, if any
    fn latest_tag(&self) -> Result<Option<String>>;

    /// Subject lines of commits after `reference` up to HEAD, oldest first.
    /// `None` walks the whole history.
    fn commits_since(&self, reference: Option<&str>) -> Result<Vec<String>>;

    /// Fails if tracked files have uncommitted changes
    fn ensure_clean_working_tree(&self) -> Result<()>;

    /// Fails if the remote is not configured or cannot be contacted
    fn ensure_remote_reachable(&self, remote: &str) -> Result<()>;

    /// Fetch URL of a remote
    fn remote_url(&self, remote: &str) -> Result<Option<String>>;

    fn stage_all(&self) -> Result<()>;

    fn commit(&self, message: &str) -> Result<()>;

    /// Create an annotated tag on HEAD
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()>;

    fn push_branch(&self, remote: &str, branch: &str, extra_args: &[String]) -> Result<PushOutcome>;

    fn push_tag(&self, remote: &str, tag: &str, extra_args: &[String]) -> Result<()>;

    fn tag_exists_locally(&self, tag: &str) -> Result<bool>;

    fn tag_exists_remotely(&self, remote: &str, tag: &str) -> Result<bool>;

    fn delete_local_tag(&self, tag: &str) -> Result<()>;

    fn delete_remote_tag(&self, remote: &str, tag: &str) -> Result<()>;

    fn branch_exists(&self, branch: &str) -> Result<bool>;

    /// Switch to `branch`, creating it from `start_point` when given
    fn checkout(&self, branch: &str, start_point: Option<&str>) -> Result<()>;

    /// Rebase the current branch onto its remote counterpart
    fn pull_rebase(&self, remote: &str, branch: &str) -> Result<()>;

    /// Fetch branches and tags from a remote
    fn fetch(&self, remote: &str) -> Result<()>;

    /// Point a local branch at its remote-tracking counterpart
    fn reset_branch_to_remote(&self, remote: &str, branch: &str) -> Result<()>;

    /// Whether the `git flow` extension is available
    fn flow_installed(&self) -> Result<bool>;

    /// Finish a `git flow` release: merge into main and develop, create `tag`
    fn flow_release_finish(&self, version: &str, tag: &str, tag_message: &str) -> Result<()>;
}
