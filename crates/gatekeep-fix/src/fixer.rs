//! Fixer contracts.
//!
//! Linters and formatters are black boxes to the pipeline: they consume
//! file content plus a file-type hint and report whether they changed it.
//! The pipeline never interprets specific diagnostic codes.

use std::path::Path;

use async_trait::async_trait;

use crate::error::FixResult;
use crate::kind::FileKind;

/// Result of a formatter invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatOutcome {
    /// The content was already formatted.
    Unchanged,
    /// The formatter produced new content.
    Rewritten(String),
}

/// Result of a lint-with-autofix invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LintReport {
    /// Unresolved errors after auto-fixing.
    pub error_count: u32,
    /// Unresolved warnings after auto-fixing.
    pub warning_count: u32,
    /// The auto-fixed content, if the linter changed anything.
    pub fixed_content: Option<String>,
    /// Human-readable diagnostics, already formatted for display.
    pub diagnostics: String,
}

impl LintReport {
    /// A report with no remaining diagnostics.
    pub fn clean(fixed_content: Option<String>) -> Self {
        Self {
            error_count: 0,
            warning_count: 0,
            fixed_content,
            diagnostics: String::new(),
        }
    }

    /// Returns `true` if no errors or warnings remain.
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }
}

/// A content formatter.
#[async_trait]
pub trait Formatter: Send + Sync {
    /// Format `content`; `path` and `kind` are hints for parser selection.
    async fn format(&self, path: &Path, content: &str, kind: FileKind)
        -> FixResult<FormatOutcome>;
}

/// A linter with auto-fix.
#[async_trait]
pub trait Linter: Send + Sync {
    /// Lint `content`, attempting auto-fixes, and report what remains.
    async fn lint_fix(&self, path: &Path, content: &str) -> FixResult<LintReport>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_report_has_no_diagnostics() {
        let report = LintReport::clean(None);
        assert!(report.is_clean());
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn report_with_warnings_is_not_clean() {
        let report = LintReport {
            error_count: 0,
            warning_count: 2,
            fixed_content: None,
            diagnostics: "2 warnings".into(),
        };
        assert!(!report.is_clean());
    }
}
