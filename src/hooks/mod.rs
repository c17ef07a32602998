//! Shell-command hooks for extensibility
//!
//! Users run commands at fixed lifecycle phases:
//! - pre-checks: before preconditions are verified
//! - pre-workflow: after confirmation, before any git mutation
//! - post-push: after the workflow pushed branches and tags
//! - post-bump: after the version bump is committed and pushed
//! - post-release: after publication
//!
//! Commands come from trusted configuration; substituted values are not
//! shell-escaped.

pub mod executor;
pub mod lifecycle;

pub use executor::{shell_command, HookExecutor};
pub use lifecycle::Phase;
