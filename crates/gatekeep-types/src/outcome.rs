//! Per-file results of the mutation pipeline.

use std::path::PathBuf;

/// What happened to a single staged file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    /// No applicable transform, excluded by ignore rules, or empty content.
    Skipped,
    /// Transforms ran but produced identical content; nothing written.
    Unchanged,
    /// Content was rewritten on disk and re-staged.
    Rewritten,
    /// The file could not be processed; carries the message shown to the
    /// developer (lint diagnostics, fixer error, I/O error).
    Failed(String),
}

impl MutationOutcome {
    /// Returns `true` for [`MutationOutcome::Failed`].
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The failure message, if any.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// A single file's outcome, in staged-set order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileOutcome {
    /// Absolute path of the processed file.
    pub path: PathBuf,
    /// What happened to it.
    pub outcome: MutationOutcome,
}

impl FileOutcome {
    /// Create a new outcome entry.
    pub fn new(path: impl Into<PathBuf>, outcome: MutationOutcome) -> Self {
        Self {
            path: path.into(),
            outcome,
        }
    }

    /// Returns `true` if this file failed.
    pub fn is_failure(&self) -> bool {
        self.outcome.is_failure()
    }
}

/// Collect every failure message from a batch of outcomes, in order.
pub fn failure_messages(outcomes: &[FileOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .filter_map(|o| o.outcome.failure_message().map(str::to_string))
        .collect()
}

/// Count the files that were actually rewritten.
pub fn rewritten_count(outcomes: &[FileOutcome]) -> usize {
    outcomes
        .iter()
        .filter(|o| o.outcome == MutationOutcome::Rewritten)
        .count()
}
