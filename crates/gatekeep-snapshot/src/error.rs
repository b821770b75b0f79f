use thiserror::Error;

use gatekeep_git::VcsError;

/// Errors from snapshot operations.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// An underlying VCS primitive failed.
    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// Result alias for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;
