use thiserror::Error;

/// Unified error type for release-flow operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Workflow failed: {0}")]
    Workflow(String),

    #[error("Hook `{command}` failed: {message}")]
    Extension { command: String, message: String },

    #[error("Publication failed: {0}")]
    Publication(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in release-flow
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a precondition error with context
    pub fn precondition(msg: impl Into<String>) -> Self {
        ReleaseError::Precondition(msg.into())
    }

    /// Create a workflow error with context
    pub fn workflow(msg: impl Into<String>) -> Self {
        ReleaseError::Workflow(msg.into())
    }

    /// Create an extension error naming the failing hook command
    pub fn extension(command: impl Into<String>, msg: impl Into<String>) -> Self {
        ReleaseError::Extension {
            command: command.into(),
            message: msg.into(),
        }
    }

    /// Create a publication error with context
    pub fn publication(msg: impl Into<String>) -> Self {
        ReleaseError::Publication(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Whether this error must abort the run.
    ///
    /// Publication failures degrade gracefully; everything else bubbles up
    /// to the orchestrator and terminates the process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ReleaseError::Publication(_))
    }
}
