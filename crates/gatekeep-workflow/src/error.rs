use thiserror::Error;

/// Errors surfaced by workflow runs.
///
/// Per-file fixer failures aggregate into [`WorkflowError::Checks`]; VCS and
/// snapshot failures are fatal to the run; [`WorkflowError::Fatal`] covers
/// process-level conditions.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// One or more files failed their checks. Messages are shown to the
    /// developer, each followed by a blank line.
    #[error("Checks failed with the following errors:\n\n{}", messages.join("\n\n"))]
    Checks { messages: Vec<String> },

    /// A VCS primitive failed; the run was aborted.
    #[error(transparent)]
    Vcs(#[from] gatekeep_git::VcsError),

    /// Snapshot save/restore failed; the run was aborted.
    #[error(transparent)]
    Snapshot(#[from] gatekeep_snapshot::SnapshotError),

    /// A heavy check (type-check, integrity) failed.
    #[error(transparent)]
    Check(#[from] gatekeep_checks::CheckError),

    /// Project detection or configuration failed.
    #[error(transparent)]
    Project(#[from] gatekeep_project::ProjectError),

    /// A process-level fatal condition.
    #[error("fatal: {0}")]
    Fatal(String),
}

/// Result alias for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
