use std::path::PathBuf;

use thiserror::Error;

/// Errors from project detection and configuration.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// No `package.json` was found; gatekeep must run inside a JS/TS
    /// project.
    #[error("no package.json found in {0}; run this command in the root of a JS/TS project")]
    NoPackageJson(PathBuf),

    /// `package.json` exists but could not be parsed.
    #[error("invalid package.json at {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    /// `gatekeep.toml` exists but could not be parsed.
    #[error("invalid gatekeep.toml at {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    /// An underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for project operations.
pub type ProjectResult<T> = Result<T, ProjectError>;
