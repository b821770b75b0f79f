use thiserror::Error;

use gatekeep_git::VcsError;

/// Errors from fixer invocation and file processing.
#[derive(Debug, Error)]
pub enum FixError {
    /// An external fixer process failed to run or reported an error.
    #[error("fixer `{program}` failed: {message}")]
    Fixer { program: String, message: String },

    /// A file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Re-staging a rewritten file failed.
    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// Result alias for fixer operations.
pub type FixResult<T> = Result<T, FixError>;
