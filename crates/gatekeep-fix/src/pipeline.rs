//! Per-file mutation: read, lint-fix, format, write, re-stage.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gatekeep_git::Vcs;
use gatekeep_types::{FileOutcome, MutationOutcome};
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::FixResult;
use crate::fixer::{FormatOutcome, Formatter, Linter};
use crate::ignore_rules::{IgnoreKind, IgnoreMatcher};
use crate::kind::FileKind;

/// The linter/formatter pair used for a run.
#[derive(Clone)]
pub struct FixerSet {
    pub linter: Arc<dyn Linter>,
    pub formatter: Arc<dyn Formatter>,
}

/// Processes staged files independently and concurrently.
pub struct MutationPipeline {
    vcs: Arc<dyn Vcs>,
    fixers: FixerSet,
    lint_ignore: IgnoreMatcher,
    format_ignore: IgnoreMatcher,
}

impl MutationPipeline {
    /// Build a pipeline, resolving both ignore policies against the
    /// project root.
    pub fn new(vcs: Arc<dyn Vcs>, fixers: FixerSet, project_root: &Path) -> Self {
        Self {
            vcs,
            fixers,
            lint_ignore: IgnoreMatcher::for_kind(project_root, IgnoreKind::Lint),
            format_ignore: IgnoreMatcher::for_kind(project_root, IgnoreKind::Format),
        }
    }

    /// Process every staged file concurrently; outcomes come back in input
    /// order. Failures are per-file and never abort the batch.
    pub async fn run(self: Arc<Self>, staged: Vec<PathBuf>) -> Vec<FileOutcome> {
        let mut tasks = JoinSet::new();
        for (index, path) in staged.iter().cloned().enumerate() {
            let pipeline = Arc::clone(&self);
            tasks.spawn(async move {
                let outcome = pipeline.process_file(&path).await;
                (index, outcome)
            });
        }

        let mut outcomes: Vec<Option<MutationOutcome>> = vec![None; staged.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                // A panicked task loses its index; its file falls through
                // to the generic failure below while the rest stand.
                Err(err) => debug!(%err, "file task panicked"),
            }
        }

        staged
            .into_iter()
            .zip(outcomes)
            .map(|(path, outcome)| {
                let outcome = outcome.unwrap_or_else(|| {
                    MutationOutcome::Failed("file task panicked".to_string())
                });
                FileOutcome::new(path, outcome)
            })
            .collect()
    }

    /// Steps 1–7 for one file; any error becomes this file's failure.
    async fn process_file(&self, path: &Path) -> MutationOutcome {
        match self.try_process_file(path).await {
            Ok(outcome) => outcome,
            Err(err) => MutationOutcome::Failed(format!(
                "Failed to process {}:\n{err}",
                path.display()
            )),
        }
    }

    async fn try_process_file(&self, path: &Path) -> FixResult<MutationOutcome> {
        let Some(kind) = FileKind::from_path(path) else {
            return Ok(MutationOutcome::Skipped);
        };

        let should_lint = kind.lintable() && !self.lint_ignore.is_ignored(path);
        let should_format = kind.formattable() && !self.format_ignore.is_ignored(path);
        if !should_lint && !should_format {
            return Ok(MutationOutcome::Skipped);
        }

        let original = tokio::fs::read_to_string(path).await?;
        if original.trim().is_empty() {
            return Ok(MutationOutcome::Skipped);
        }

        let mut content = original.clone();

        if should_lint {
            let report = self.fixers.linter.lint_fix(path, &content).await?;
            if !report.is_clean() {
                // Unresolved diagnostics block everything else for this
                // file; the formatter must not run on broken code.
                return Ok(MutationOutcome::Failed(report.diagnostics));
            }
            if let Some(fixed) = report.fixed_content {
                content = fixed;
            }
        }

        if should_format {
            match self.fixers.formatter.format(path, &content, kind).await? {
                FormatOutcome::Unchanged => {}
                FormatOutcome::Rewritten(formatted) => content = formatted,
            }
        }

        if content == original {
            return Ok(MutationOutcome::Unchanged);
        }

        tokio::fs::write(path, &content).await?;
        self.vcs.stage_file(path).await?;
        debug!(path = %path.display(), "rewrote and re-staged");
        Ok(MutationOutcome::Rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixer::LintReport;
    use crate::stub::{FnFormatter, FnLinter};
    use gatekeep_git::MemoryVcs;

    struct Setup {
        _dir: tempfile::TempDir,
        mem: Arc<MemoryVcs>,
        root: PathBuf,
    }

    fn setup() -> Setup {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        Setup {
            mem: Arc::new(MemoryVcs::new(&root)),
            _dir: dir,
            root,
        }
    }

    fn pipeline_with(s: &Setup, fixers: FixerSet) -> Arc<MutationPipeline> {
        let vcs: Arc<dyn Vcs> = Arc::clone(&s.mem) as Arc<dyn Vcs>;
        Arc::new(MutationPipeline::new(vcs, fixers, &s.root))
    }

    fn uppercasing() -> FixerSet {
        FixerSet {
            linter: Arc::new(FnLinter::clean()),
            formatter: Arc::new(FnFormatter::new(|c| Some(c.to_uppercase()))),
        }
    }

    #[tokio::test]
    async fn unknown_extension_is_skipped() {
        let s = setup();
        s.mem.write_file("image.png", "binary-ish\n").unwrap();
        let pipeline = pipeline_with(&s, uppercasing());

        let outcomes = pipeline.run(vec![s.root.join("image.png")]).await;
        assert_eq!(outcomes[0].outcome, MutationOutcome::Skipped);
    }

    #[tokio::test]
    async fn whitespace_only_file_is_left_untouched() {
        let s = setup();
        s.mem.write_file("empty.ts", "  \n\n").unwrap();
        s.mem.commit_file("marker.ts", "x\n").unwrap();
        let pipeline = pipeline_with(&s, uppercasing());

        let outcomes = pipeline.run(vec![s.root.join("empty.ts")]).await;
        assert_eq!(outcomes[0].outcome, MutationOutcome::Skipped);
        // No write, no staging.
        assert_eq!(s.mem.disk_content("empty.ts").unwrap(), "  \n\n");
        assert_eq!(s.mem.index_content("empty.ts"), None);
    }

    #[tokio::test]
    async fn rewrite_is_written_and_staged() {
        let s = setup();
        s.mem.write_file("app.ts", "let x=1\n").unwrap();
        let pipeline = pipeline_with(&s, uppercasing());

        let outcomes = pipeline.run(vec![s.root.join("app.ts")]).await;
        assert_eq!(outcomes[0].outcome, MutationOutcome::Rewritten);
        assert_eq!(s.mem.disk_content("app.ts").unwrap(), "LET X=1\n");
        assert_eq!(s.mem.index_content("app.ts").unwrap(), "LET X=1\n");
    }

    #[tokio::test]
    async fn already_formatted_content_is_unchanged() {
        let s = setup();
        s.mem.write_file("app.ts", "DONE\n").unwrap();
        let pipeline = pipeline_with(&s, uppercasing());

        let outcomes = pipeline.run(vec![s.root.join("app.ts")]).await;
        assert_eq!(outcomes[0].outcome, MutationOutcome::Unchanged);
        assert_eq!(s.mem.index_content("app.ts"), None);
    }

    #[tokio::test]
    async fn lint_diagnostics_block_formatting() {
        let s = setup();
        s.mem.write_file("bad.ts", "var x\n").unwrap();
        let fixers = FixerSet {
            linter: Arc::new(FnLinter::new(|_, _| LintReport {
                error_count: 1,
                warning_count: 0,
                fixed_content: None,
                diagnostics: "1:1 error Unexpected var".into(),
            })),
            formatter: Arc::new(FnFormatter::new(|c| Some(c.to_uppercase()))),
        };
        let pipeline = pipeline_with(&s, fixers);

        let outcomes = pipeline.run(vec![s.root.join("bad.ts")]).await;
        match &outcomes[0].outcome {
            MutationOutcome::Failed(msg) => assert!(msg.contains("Unexpected var")),
            other => panic!("expected failure, got {other:?}"),
        }
        // The formatter never ran; the file is untouched.
        assert_eq!(s.mem.disk_content("bad.ts").unwrap(), "var x\n");
    }

    #[tokio::test]
    async fn failures_are_isolated_per_file() {
        let s = setup();
        s.mem.write_file("bad.ts", "var x\n").unwrap();
        s.mem.write_file("good.ts", "ok\n").unwrap();
        let fixers = FixerSet {
            linter: Arc::new(FnLinter::new(|path, _| {
                if path.ends_with("bad.ts") {
                    LintReport {
                        error_count: 1,
                        warning_count: 0,
                        fixed_content: None,
                        diagnostics: "broken".into(),
                    }
                } else {
                    LintReport::clean(None)
                }
            })),
            formatter: Arc::new(FnFormatter::new(|c| Some(c.to_uppercase()))),
        };
        let pipeline = pipeline_with(&s, fixers);

        let outcomes = pipeline
            .run(vec![s.root.join("bad.ts"), s.root.join("good.ts")])
            .await;
        assert!(outcomes[0].is_failure());
        assert_eq!(outcomes[1].outcome, MutationOutcome::Rewritten);
        assert_eq!(s.mem.disk_content("good.ts").unwrap(), "OK\n");
        assert_eq!(s.mem.index_content("good.ts").unwrap(), "OK\n");
    }

    #[tokio::test]
    async fn lint_fixes_feed_the_formatter() {
        let s = setup();
        s.mem.write_file("app.ts", "let x\n").unwrap();
        let fixers = FixerSet {
            linter: Arc::new(FnLinter::new(|_, content| {
                LintReport::clean(Some(content.replace("let", "const")))
            })),
            formatter: Arc::new(FnFormatter::new(|c| Some(c.to_uppercase()))),
        };
        let pipeline = pipeline_with(&s, fixers);

        let outcomes = pipeline.run(vec![s.root.join("app.ts")]).await;
        assert_eq!(outcomes[0].outcome, MutationOutcome::Rewritten);
        assert_eq!(s.mem.disk_content("app.ts").unwrap(), "CONST X\n");
    }

    #[tokio::test]
    async fn format_ignored_file_still_gets_lint_fixes() {
        let s = setup();
        std::fs::write(s.root.join(".prettierignore"), "legacy/\n").unwrap();
        s.mem.write_file("legacy/old.ts", "let x\n").unwrap();

        let fixers = FixerSet {
            linter: Arc::new(FnLinter::new(|_, content| {
                LintReport::clean(Some(content.replace("let", "const")))
            })),
            formatter: Arc::new(FnFormatter::new(|c| Some(c.to_uppercase()))),
        };
        let pipeline = pipeline_with(&s, fixers);

        let outcomes = pipeline.run(vec![s.root.join("legacy/old.ts")]).await;
        assert_eq!(outcomes[0].outcome, MutationOutcome::Rewritten);
        // Lint fix applied, formatter skipped.
        assert_eq!(s.mem.disk_content("legacy/old.ts").unwrap(), "const x\n");
    }

    #[tokio::test]
    async fn file_ignored_by_both_policies_is_skipped() {
        let s = setup();
        std::fs::write(s.root.join(".gatekeepignore"), "generated/\n").unwrap();
        s.mem.write_file("generated/api.ts", "let x\n").unwrap();
        let pipeline = pipeline_with(&s, uppercasing());

        let outcomes = pipeline.run(vec![s.root.join("generated/api.ts")]).await;
        assert_eq!(outcomes[0].outcome, MutationOutcome::Skipped);
    }

    #[tokio::test]
    async fn data_files_skip_the_linter() {
        let s = setup();
        s.mem.write_file("config.json", "{ }\n").unwrap();
        let fixers = FixerSet {
            // A linter that would fail everything it sees.
            linter: Arc::new(FnLinter::new(|_, _| LintReport {
                error_count: 1,
                warning_count: 0,
                fixed_content: None,
                diagnostics: "should never run".into(),
            })),
            formatter: Arc::new(FnFormatter::new(|c| Some(c.replace(' ', "")))),
        };
        let pipeline = pipeline_with(&s, fixers);

        let outcomes = pipeline.run(vec![s.root.join("config.json")]).await;
        assert_eq!(outcomes[0].outcome, MutationOutcome::Rewritten);
        assert_eq!(s.mem.disk_content("config.json").unwrap(), "{}\n");
    }

    #[tokio::test]
    async fn unreadable_file_fails_only_itself() {
        let s = setup();
        s.mem.write_file("ok.ts", "fine\n").unwrap();
        let pipeline = pipeline_with(&s, uppercasing());

        let outcomes = pipeline
            .run(vec![s.root.join("missing.ts"), s.root.join("ok.ts")])
            .await;
        assert!(outcomes[0].is_failure());
        assert_eq!(outcomes[1].outcome, MutationOutcome::Rewritten);
    }
}
