//! Fixers backed by external processes.
//!
//! The convention: the configured command receives the file path as its
//! final argument and the file content on stdin, and writes the resulting
//! content to stdout. Exit status zero means success; for linters, a
//! non-zero exit means unresolved diagnostics, reported on stdout/stderr.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{FixError, FixResult};
use crate::fixer::{FormatOutcome, Formatter, LintReport, Linter};
use crate::kind::FileKind;

async fn run_fixer(
    program: &Path,
    args: &[String],
    path: &Path,
    input: &str,
) -> FixResult<std::process::Output> {
    debug!(program = %program.display(), path = %path.display(), "running fixer");
    let mut child = Command::new(program)
        .args(args)
        .arg(path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| FixError::Fixer {
            program: program.display().to_string(),
            message: err.to_string(),
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes()).await?;
    }
    Ok(child.wait_with_output().await?)
}

/// Formatter invoking an external process.
pub struct CommandFormatter {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandFormatter {
    /// Create a formatter for the given executable and fixed arguments.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Formatter for CommandFormatter {
    async fn format(
        &self,
        path: &Path,
        content: &str,
        _kind: FileKind,
    ) -> FixResult<FormatOutcome> {
        let output = run_fixer(&self.program, &self.args, path, content).await?;
        if !output.status.success() {
            return Err(FixError::Fixer {
                program: self.program.display().to_string(),
                message: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let formatted = String::from_utf8_lossy(&output.stdout).into_owned();
        Ok(if formatted == content {
            FormatOutcome::Unchanged
        } else {
            FormatOutcome::Rewritten(formatted)
        })
    }
}

/// Linter invoking an external process.
///
/// Exit zero means the content is clean; stdout carries the (possibly
/// auto-fixed) content. A non-zero exit means unresolved diagnostics; the
/// combined stdout/stderr text becomes the report's diagnostics verbatim.
pub struct CommandLinter {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandLinter {
    /// Create a linter for the given executable and fixed arguments.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Linter for CommandLinter {
    async fn lint_fix(&self, path: &Path, content: &str) -> FixResult<LintReport> {
        let output = run_fixer(&self.program, &self.args, path, content).await?;

        if output.status.success() {
            let fixed = String::from_utf8_lossy(&output.stdout).into_owned();
            let fixed_content = (!fixed.is_empty() && fixed != content).then_some(fixed);
            return Ok(LintReport::clean(fixed_content));
        }

        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !diagnostics.is_empty() {
                diagnostics.push('\n');
            }
            diagnostics.push_str(stderr.trim_end());
        }

        Ok(LintReport {
            error_count: 1,
            warning_count: 0,
            fixed_content: None,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests rely on POSIX `sh`, which is available wherever the
    // suite runs.

    fn sh(script: &str) -> (PathBuf, Vec<String>) {
        ("sh".into(), vec!["-c".into(), script.into(), "sh".into()])
    }

    #[tokio::test]
    async fn command_formatter_passes_content_through_stdio() {
        let (program, args) = sh("tr a-z A-Z");
        let formatter = CommandFormatter::new(program, args);
        let outcome = formatter
            .format(Path::new("a.ts"), "abc", FileKind::TypeScript)
            .await
            .unwrap();
        assert_eq!(outcome, FormatOutcome::Rewritten("ABC".into()));
    }

    #[tokio::test]
    async fn command_formatter_detects_unchanged_output() {
        let (program, args) = sh("cat");
        let formatter = CommandFormatter::new(program, args);
        let outcome = formatter
            .format(Path::new("a.ts"), "same", FileKind::TypeScript)
            .await
            .unwrap();
        assert_eq!(outcome, FormatOutcome::Unchanged);
    }

    #[tokio::test]
    async fn missing_program_is_a_fixer_error() {
        let formatter =
            CommandFormatter::new("/nonexistent/formatter-binary", Vec::new());
        let result = formatter
            .format(Path::new("a.ts"), "x", FileKind::TypeScript)
            .await;
        assert!(matches!(result, Err(FixError::Fixer { .. })));
    }

    #[tokio::test]
    async fn failing_linter_reports_diagnostics() {
        let (program, args) = sh("echo 'unexpected var'; exit 1");
        let linter = CommandLinter::new(program, args);
        let report = linter.lint_fix(Path::new("a.ts"), "var x").await.unwrap();
        assert!(!report.is_clean());
        assert!(report.diagnostics.contains("unexpected var"));
    }

    #[tokio::test]
    async fn clean_linter_returns_fixed_content() {
        let (program, args) = sh("tr a-z A-Z");
        let linter = CommandLinter::new(program, args);
        let report = linter.lint_fix(Path::new("a.ts"), "abc").await.unwrap();
        assert!(report.is_clean());
        assert_eq!(report.fixed_content, Some("ABC".into()));
    }
}
