use std::fmt;

/// Non-fatal conditions met at the edges of a release (repository history,
/// config files, manifests). They are reported to the user and the run continues.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No new commits since the latest tag
    NoNewCommits { latest_tag: String },
    /// Tag exists but cannot be parsed as a version
    UnparsableTag { tag: String, reason: String },
    /// A discovered config source could not be read; defaults apply
    ConfigParseFailed { path: String, reason: String },
    /// No manifest in the working directory; the version comes from elsewhere
    ManifestMissing { fallback_version: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoNewCommits { latest_tag } => {
                write!(f, "No new commits since tag '{}'", latest_tag)
            }
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            BoundaryWarning::ConfigParseFailed { path, reason } => {
                write!(
                    f,
                    "Cannot parse config '{}', using defaults: {}",
                    path, reason
                )
            }
            BoundaryWarning::ManifestMissing { fallback_version } => {
                write!(
                    f,
                    "No package.json found, using version {}",
                    fallback_version
                )
            }
        }
    }
}
