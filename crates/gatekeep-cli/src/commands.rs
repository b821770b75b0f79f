use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use colored::Colorize;
use gatekeep_checks::{check_lock_integrity, run_type_check, CoreAllocator};
use gatekeep_fix::{CommandFormatter, CommandLinter, FixerSet};
use gatekeep_git::{GitVcs, Vcs};
use gatekeep_project::{GatekeepConfig, ProjectContext};
use gatekeep_types::CleanupRegistry;
use gatekeep_workflow::{run_format_all, run_lint_all, run_pre_commit};

use crate::cli::{CheckupArgs, Cli, Command};

pub async fn run_command(cli: Cli, registry: Arc<CleanupRegistry>) -> anyhow::Result<()> {
    match cli.command {
        Command::PreCommit(_) => handle_pre_commit(&registry).await,
        Command::Checkup(args) => handle_checkup(&args).await,
    }
}

async fn handle_pre_commit(registry: &CleanupRegistry) -> anyhow::Result<()> {
    let (ctx, vcs) = prepare().await?;
    let fixers = build_fixers(&ctx)?;

    let project_root = ctx.project_root.clone();
    let report = step("Running pre-commit checks", || async {
        run_pre_commit(vcs, fixers, &project_root, registry)
            .await
            .map_err(anyhow::Error::from)
    })
    .await?;

    if !report.rewritten.is_empty() {
        println!(
            "{}",
            format!("{} file(s) were fixed and re-staged:", report.rewritten.len()).dimmed()
        );
        for path in &report.rewritten {
            println!("{}", format!("  {}", path.display()).dimmed());
        }
    }
    Ok(())
}

async fn handle_checkup(args: &CheckupArgs) -> anyhow::Result<()> {
    let (ctx, _vcs) = prepare().await?;
    let fixers = build_fixers(&ctx)?;
    let allocator = CoreAllocator::new();
    let selected = args.selected();

    if selected.integrity {
        step("Checking dependency-lock integrity", || async {
            check_lock_integrity(&ctx).await.map_err(anyhow::Error::from)
        })
        .await?;
    }

    if selected.types {
        step("Running TypeScript checks", || async {
            run_type_check(&ctx, &allocator)
                .await
                .map_err(anyhow::Error::from)
        })
        .await?;
    }

    if selected.lint {
        let linter = Arc::clone(&fixers.linter);
        step("Linting the project", || async {
            run_lint_all(&ctx, linter, &allocator, args.fix)
                .await
                .map_err(anyhow::Error::from)
        })
        .await?;
    }

    if selected.format {
        let formatter = Arc::clone(&fixers.formatter);
        let rewritten = step("Formatting the project", || async {
            run_format_all(&ctx, formatter, &allocator)
                .await
                .map_err(anyhow::Error::from)
        })
        .await?;
        if rewritten > 0 {
            println!("{}", format!("{rewritten} file(s) reformatted").dimmed());
        }
    }

    Ok(())
}

/// Resolve the project context and make sure we are inside a repository.
async fn prepare() -> anyhow::Result<(ProjectContext, Arc<dyn Vcs>)> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let ctx = ProjectContext::describe(&cwd)?;
    let vcs: Arc<dyn Vcs> = Arc::new(GitVcs::new(ctx.project_root.clone()));

    if !vcs.is_repository().await {
        bail!("failed to run: the project must be a git repository");
    }
    Ok((ctx, vcs))
}

/// Wire the configured (or default, project-local) fixer commands.
///
/// Both commands receive the file path as their final argument and the
/// content on stdin, and write the result to stdout; the defaults follow
/// that convention via prettier's `--stdin-filepath` and eslint's
/// `--stdin --stdin-filename`.
fn build_fixers(ctx: &ProjectContext) -> anyhow::Result<FixerSet> {
    let config = GatekeepConfig::load(&ctx.project_root)?;
    let bin = ctx.project_root.join("node_modules/.bin");

    let (format_program, mut format_args) = GatekeepConfig::resolve_command(
        config.fixers.format_command.as_deref(),
        bin.join("prettier"),
    );
    if config.fixers.format_command.is_none() {
        format_args = vec!["--stdin-filepath".into()];
    }

    let (lint_program, mut lint_args) = GatekeepConfig::resolve_command(
        config.fixers.lint_command.as_deref(),
        bin.join("eslint"),
    );
    if config.fixers.lint_command.is_none() {
        lint_args = vec!["--quiet".into(), "--stdin".into(), "--stdin-filename".into()];
    }

    Ok(FixerSet {
        linter: Arc::new(CommandLinter::new(lint_program, lint_args)),
        formatter: Arc::new(CommandFormatter::new(format_program, format_args)),
    })
}

/// Run one named step with a ✔/✖ status line and duration.
async fn step<T, F, Fut>(description: &str, run: F) -> anyhow::Result<T>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<T>>,
{
    println!("{}", format!("▸ {description}...").cyan());
    let started = Instant::now();
    match run().await {
        Ok(value) => {
            let elapsed = started.elapsed();
            println!(
                "{} {}",
                format!("✔ {description}").green(),
                format!("({}ms)", elapsed.as_millis()).dimmed()
            );
            Ok(value)
        }
        Err(err) => {
            println!("{}", format!("✖ {description}").red());
            Err(err)
        }
    }
}
