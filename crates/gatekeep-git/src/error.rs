use std::path::PathBuf;

use thiserror::Error;

/// Errors from VCS operations.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The working directory is not inside a repository.
    #[error("not a repository: {0}")]
    NotARepository(PathBuf),

    /// A VCS command exited with a failure status.
    #[error("`{command}` failed with status {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    /// A VCS command produced output that could not be decoded.
    #[error("invalid output from `{command}`: {reason}")]
    InvalidOutput { command: String, reason: String },

    /// The requested tree snapshot does not exist.
    #[error("unknown tree: {0}")]
    UnknownTree(String),

    /// An underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A produced object id was malformed.
    #[error(transparent)]
    Type(#[from] gatekeep_types::TypeError),
}

/// Result alias for VCS operations.
pub type VcsResult<T> = Result<T, VcsError>;
