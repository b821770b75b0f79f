//! Closure-backed fixers, intended for tests and embedding.

use std::path::Path;

use async_trait::async_trait;

use crate::error::FixResult;
use crate::fixer::{FormatOutcome, Formatter, LintReport, Linter};
use crate::kind::FileKind;

type TransformFn = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;
type LintFn = Box<dyn Fn(&Path, &str) -> LintReport + Send + Sync>;

/// Formatter driven by a closure: return `Some(new)` to rewrite, `None` to
/// leave content unchanged.
pub struct FnFormatter {
    transform: TransformFn,
}

impl FnFormatter {
    /// Wrap a transform closure.
    pub fn new(transform: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            transform: Box::new(transform),
        }
    }

    /// A formatter that never changes anything.
    pub fn passthrough() -> Self {
        Self::new(|_| None)
    }
}

#[async_trait]
impl Formatter for FnFormatter {
    async fn format(
        &self,
        _path: &Path,
        content: &str,
        _kind: FileKind,
    ) -> FixResult<FormatOutcome> {
        Ok(match (self.transform)(content) {
            Some(new) if new != content => FormatOutcome::Rewritten(new),
            _ => FormatOutcome::Unchanged,
        })
    }
}

/// Linter driven by a closure producing the full report.
pub struct FnLinter {
    lint: LintFn,
}

impl FnLinter {
    /// Wrap a lint closure.
    pub fn new(lint: impl Fn(&Path, &str) -> LintReport + Send + Sync + 'static) -> Self {
        Self {
            lint: Box::new(lint),
        }
    }

    /// A linter that always reports clean with no fixes.
    pub fn clean() -> Self {
        Self::new(|_, _| LintReport::clean(None))
    }
}

#[async_trait]
impl Linter for FnLinter {
    async fn lint_fix(&self, path: &Path, content: &str) -> FixResult<LintReport> {
        Ok((self.lint)(path, content))
    }
}
