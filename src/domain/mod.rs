//! Domain logic - pure release rules independent of git, files and prompts

pub mod branch;
pub mod commit;
pub mod prerelease;
pub mod tag;
pub mod version;

pub use branch::{is_release_allowed, BranchModel};
pub use commit::ParsedCommit;
pub use prerelease::{normalize_preid, PreRelease};
pub use tag::TagPattern;
pub use version::{next_version, BumpKind, Version};
