//! Whole-project lint and format passes for the `checkup` command.
//!
//! Unlike the pre-commit gate, these walk every matching file under the
//! context's scope (respecting VCS ignore rules), not just the staged set,
//! and never touch the index. External fixer invocations are bounded by
//! the core allocator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gatekeep_checks::CoreAllocator;
use gatekeep_fix::{FileKind, FormatOutcome, Formatter, IgnoreKind, IgnoreMatcher, Linter};
use gatekeep_project::ProjectContext;
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::{WorkflowError, WorkflowResult};

/// Collect the files a checkup pass should visit.
fn candidate_files(scope_root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = ignore::WalkBuilder::new(scope_root)
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| {
            !path
                .components()
                .any(|c| c.as_os_str() == "node_modules")
        })
        .filter(|path| FileKind::from_path(path).is_some())
        .collect();
    files.sort();
    files
}

/// Lint every eligible file under the context's scope.
///
/// With `fix`, clean auto-fixes are written back to disk. Files with
/// remaining diagnostics aggregate into a single failure.
pub async fn run_lint_all(
    ctx: &ProjectContext,
    linter: Arc<dyn Linter>,
    allocator: &CoreAllocator,
    fix: bool,
) -> WorkflowResult<()> {
    let lint_ignore = IgnoreMatcher::for_kind(&ctx.project_root, IgnoreKind::Lint);
    let files: Vec<PathBuf> = candidate_files(ctx.scope_root())
        .into_iter()
        .filter(|path| {
            FileKind::from_path(path).is_some_and(|k| k.lintable())
                && !lint_ignore.is_ignored(path)
        })
        .collect();
    debug!(count = files.len(), "linting project files");

    let mut tasks = JoinSet::new();
    for path in files {
        let linter = Arc::clone(&linter);
        let allocator = allocator.clone();
        tasks.spawn(async move {
            let _core = allocator.allocate().await;
            lint_one(&*linter, &path, fix).await
        });
    }

    let mut messages = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(None) => {}
            Ok(Some(message)) => messages.push(message),
            Err(err) => messages.push(format!("lint task panicked: {err}")),
        }
    }

    if messages.is_empty() {
        Ok(())
    } else {
        messages.sort();
        Err(WorkflowError::Checks { messages })
    }
}

async fn lint_one(linter: &dyn Linter, path: &Path, fix: bool) -> Option<String> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) => return Some(format!("Failed to read {}:\n{err}", path.display())),
    };
    if content.trim().is_empty() {
        return None;
    }

    match linter.lint_fix(path, &content).await {
        Ok(report) if report.is_clean() => {
            if fix {
                if let Some(fixed) = report.fixed_content {
                    if fixed != content {
                        if let Err(err) = tokio::fs::write(path, fixed).await {
                            return Some(format!(
                                "Failed to write fixes to {}:\n{err}",
                                path.display()
                            ));
                        }
                    }
                }
            }
            None
        }
        Ok(report) => Some(report.diagnostics),
        Err(err) => Some(format!("Failed to lint {}:\n{err}", path.display())),
    }
}

/// Format every eligible file under the context's scope, writing changes
/// in place. Returns the number of files rewritten.
pub async fn run_format_all(
    ctx: &ProjectContext,
    formatter: Arc<dyn Formatter>,
    allocator: &CoreAllocator,
) -> WorkflowResult<usize> {
    let format_ignore = IgnoreMatcher::for_kind(&ctx.project_root, IgnoreKind::Format);
    let files: Vec<PathBuf> = candidate_files(ctx.scope_root())
        .into_iter()
        .filter(|path| !format_ignore.is_ignored(path))
        .collect();
    debug!(count = files.len(), "formatting project files");

    let mut tasks = JoinSet::new();
    for path in files {
        let formatter = Arc::clone(&formatter);
        let allocator = allocator.clone();
        tasks.spawn(async move {
            let _core = allocator.allocate().await;
            format_one(&*formatter, &path).await
        });
    }

    let mut rewritten = 0;
    let mut messages = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(changed)) => rewritten += usize::from(changed),
            Ok(Err(message)) => messages.push(message),
            Err(err) => messages.push(format!("format task panicked: {err}")),
        }
    }

    if messages.is_empty() {
        Ok(rewritten)
    } else {
        messages.sort();
        Err(WorkflowError::Checks { messages })
    }
}

async fn format_one(formatter: &dyn Formatter, path: &Path) -> Result<bool, String> {
    let Some(kind) = FileKind::from_path(path) else {
        return Ok(false);
    };
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| format!("Failed to read {}:\n{err}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(false);
    }

    match formatter.format(path, &content, kind).await {
        Ok(FormatOutcome::Unchanged) => Ok(false),
        Ok(FormatOutcome::Rewritten(formatted)) => {
            tokio::fs::write(path, formatted)
                .await
                .map_err(|err| format!("Failed to write {}:\n{err}", path.display()))?;
            Ok(true)
        }
        Err(err) => Err(format!(
            "Failed to run the formatter on {}:\n{err}",
            path.display()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekeep_fix::fixer::LintReport;
    use gatekeep_fix::stub::{FnFormatter, FnLinter};

    struct Setup {
        _dir: tempfile::TempDir,
        ctx: ProjectContext,
        allocator: CoreAllocator,
    }

    fn setup() -> Setup {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{ "name": "app" }"#).unwrap();
        let ctx = ProjectContext::describe(dir.path()).unwrap();
        Setup {
            _dir: dir,
            ctx,
            allocator: CoreAllocator::with_capacity(2),
        }
    }

    fn write(s: &Setup, rel: &str, content: &str) {
        let path = s.ctx.project_root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn read(s: &Setup, rel: &str) -> String {
        std::fs::read_to_string(s.ctx.project_root.join(rel)).unwrap()
    }

    #[tokio::test]
    async fn format_all_rewrites_eligible_files() {
        let s = setup();
        write(&s, "src/app.ts", "let x=1\n");
        write(&s, "src/notes.txt", "not code\n");

        let formatter = Arc::new(FnFormatter::new(|c| Some(c.to_uppercase())));
        let rewritten = run_format_all(&s.ctx, formatter, &s.allocator)
            .await
            .unwrap();

        assert_eq!(rewritten, 1);
        assert_eq!(read(&s, "src/app.ts"), "LET X=1\n");
        assert_eq!(read(&s, "src/notes.txt"), "not code\n");
    }

    #[tokio::test]
    async fn format_all_respects_ignore_file() {
        let s = setup();
        write(&s, ".prettierignore", "legacy/\n");
        write(&s, "legacy/old.ts", "let x=1\n");
        write(&s, "src/new.ts", "let x=1\n");

        let formatter = Arc::new(FnFormatter::new(|c| Some(c.to_uppercase())));
        let rewritten = run_format_all(&s.ctx, formatter, &s.allocator)
            .await
            .unwrap();

        assert_eq!(rewritten, 1);
        assert_eq!(read(&s, "legacy/old.ts"), "let x=1\n");
    }

    #[tokio::test]
    async fn format_all_skips_node_modules() {
        let s = setup();
        write(&s, "node_modules/dep/index.js", "let x=1\n");
        write(&s, "src/app.js", "let x=1\n");

        let formatter = Arc::new(FnFormatter::new(|c| Some(c.to_uppercase())));
        let rewritten = run_format_all(&s.ctx, formatter, &s.allocator)
            .await
            .unwrap();

        assert_eq!(rewritten, 1);
        assert_eq!(read(&s, "node_modules/dep/index.js"), "let x=1\n");
    }

    #[tokio::test]
    async fn lint_all_aggregates_diagnostics() {
        let s = setup();
        write(&s, "src/one.ts", "var a\n");
        write(&s, "src/two.ts", "var b\n");
        write(&s, "src/styles.css", "body {}\n");

        let linter = Arc::new(FnLinter::new(|path, _| LintReport {
            error_count: 1,
            warning_count: 0,
            fixed_content: None,
            diagnostics: format!("{}: no var", path.display()),
        }));

        let err = run_lint_all(&s.ctx, linter, &s.allocator, false)
            .await
            .unwrap_err();
        match err {
            WorkflowError::Checks { messages } => {
                // Only the two lintable files produced diagnostics.
                assert_eq!(messages.len(), 2);
            }
            other => panic!("expected Checks, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lint_all_with_fix_writes_fixes() {
        let s = setup();
        write(&s, "src/app.ts", "var x\n");

        let linter = Arc::new(FnLinter::new(|_, content| {
            LintReport::clean(Some(content.replace("var", "const")))
        }));

        run_lint_all(&s.ctx, linter, &s.allocator, true)
            .await
            .unwrap();
        assert_eq!(read(&s, "src/app.ts"), "const x\n");
    }

    #[tokio::test]
    async fn lint_all_without_fix_leaves_files_alone() {
        let s = setup();
        write(&s, "src/app.ts", "var x\n");

        let linter = Arc::new(FnLinter::new(|_, content| {
            LintReport::clean(Some(content.replace("var", "const")))
        }));

        run_lint_all(&s.ctx, linter, &s.allocator, false)
            .await
            .unwrap();
        assert_eq!(read(&s, "src/app.ts"), "var x\n");
    }
}
