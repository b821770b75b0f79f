use thiserror::Error;

use crate::typecheck::{render_failures, TypeCheckFailure};

/// Errors from heavy checks.
#[derive(Debug, Error)]
pub enum CheckError {
    /// One or more packages failed type-checking.
    #[error("{}", render_failures(failures))]
    TypeCheck { failures: Vec<TypeCheckFailure> },

    /// The dependency lockfile does not match installed content.
    #[error("Integrity check failed with the following errors:\n{output}\n{hint}")]
    Integrity { output: String, hint: String },

    /// A package audit reported problems or failed to run.
    #[error("{message}")]
    Audit { message: String },

    /// An external tool could not be launched.
    #[error("failed to run `{command}`: {message}")]
    Tool { command: String, message: String },

    /// An underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for check operations.
pub type CheckResult<T> = Result<T, CheckError>;
