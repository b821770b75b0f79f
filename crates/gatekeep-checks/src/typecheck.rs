//! TypeScript type-check orchestration.
//!
//! Runs `tsc --noEmit` once per TypeScript package (any directory carrying
//! a `tsconfig.json`), bounded by the [`CoreAllocator`]. Per-package
//! failures are aggregated into a single report with a banner per package.

use std::path::{Path, PathBuf};

use gatekeep_project::{ProjectContext, ProjectKind};
use tokio::task::JoinSet;
use tracing::debug;

use crate::cpu::CoreAllocator;
use crate::error::{CheckError, CheckResult};

const BANNER_WIDTH: usize = 76;

/// A package whose type check reported errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeCheckFailure {
    pub package: String,
    pub output: String,
}

/// Returns `true` if the context has anything to type-check.
pub fn contains_typescript(ctx: &ProjectContext) -> bool {
    match ctx.kind {
        ProjectKind::Monorepo => ctx
            .packages_path
            .as_deref()
            .is_some_and(|p| !typescript_packages(p).is_empty()),
        _ => ctx.scope_root().join("tsconfig.json").exists(),
    }
}

/// Directories under `packages_path` carrying a `tsconfig.json`.
pub fn typescript_packages(packages_path: &Path) -> Vec<(String, PathBuf)> {
    let Ok(entries) = std::fs::read_dir(packages_path) else {
        return Vec::new();
    };
    let mut packages: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
        .filter(|(_, path)| path.join("tsconfig.json").exists())
        .collect();
    packages.sort();
    packages
}

/// Type-check every TypeScript package in the context.
pub async fn run_type_check(ctx: &ProjectContext, allocator: &CoreAllocator) -> CheckResult<()> {
    let packages = match ctx.kind {
        ProjectKind::Monorepo => match ctx.packages_path.as_deref() {
            Some(path) => typescript_packages(path),
            None => Vec::new(),
        },
        _ => {
            let root = ctx.scope_root();
            if root.join("tsconfig.json").exists() {
                vec![(package_name(root), root.to_path_buf())]
            } else {
                Vec::new()
            }
        }
    };

    if packages.is_empty() {
        debug!("no TypeScript packages; skipping type check");
        return Ok(());
    }

    let tsc = ctx.project_root.join("node_modules/.bin/tsc");
    let mut tasks = JoinSet::new();
    for (name, path) in packages {
        let allocator = allocator.clone();
        let tsc = tsc.clone();
        tasks.spawn(async move {
            let _core = allocator.allocate().await;
            run_tsc(&tsc, &name, &path).await
        });
    }

    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(failure)) => failures.push(failure),
            Err(err) => failures.push(TypeCheckFailure {
                package: "<internal>".into(),
                output: err.to_string(),
            }),
        }
    }

    if failures.is_empty() {
        return Ok(());
    }
    failures.sort_by(|a, b| a.package.cmp(&b.package));
    Err(CheckError::TypeCheck { failures })
}

async fn run_tsc(tsc: &Path, name: &str, path: &Path) -> Result<(), TypeCheckFailure> {
    debug!(package = name, "running tsc");
    let output = tokio::process::Command::new(tsc)
        .args(["--noEmit", "--pretty"])
        .current_dir(path)
        .output()
        .await
        .map_err(|err| TypeCheckFailure {
            package: name.to_string(),
            output: format!("failed to launch tsc: {err}"),
        })?;

    if output.status.success() {
        return Ok(());
    }
    Err(TypeCheckFailure {
        package: name.to_string(),
        output: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}

fn package_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

/// Render aggregated failures: a count header plus one banner per package.
pub fn render_failures(failures: &[TypeCheckFailure]) -> String {
    let header = if failures.len() == 1 {
        "1 package failed with the following TypeScript errors:".to_string()
    } else {
        format!(
            "{} packages failed with the following TypeScript errors:",
            failures.len()
        )
    };

    let mut out = header;
    for failure in failures {
        out.push('\n');
        out.push_str(&banner(&failure.package));
        out.push('\n');
        out.push_str(&failure.output);
    }
    out
}

fn banner(name: &str) -> String {
    let decoration = "=".repeat(BANNER_WIDTH);
    let label = format!("Package {name}");
    let spacing = " ".repeat(BANNER_WIDTH.saturating_sub(label.len()) / 2);
    format!("\n{decoration}\n{spacing}{label}\n{decoration}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_only_typescript_packages() {
        let dir = tempfile::tempdir().unwrap();
        let packages = dir.path().join("packages");
        for (name, has_tsconfig) in [("api", true), ("docs", false), ("web", true)] {
            let pkg = packages.join(name);
            std::fs::create_dir_all(&pkg).unwrap();
            if has_tsconfig {
                std::fs::write(pkg.join("tsconfig.json"), "{}").unwrap();
            }
        }

        let found = typescript_packages(&packages);
        let names: Vec<_> = found.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["api", "web"]);
    }

    #[test]
    fn missing_packages_dir_discovers_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(typescript_packages(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn render_single_failure() {
        let failures = vec![TypeCheckFailure {
            package: "api".into(),
            output: "TS2345: argument mismatch\n".into(),
        }];
        let rendered = render_failures(&failures);
        assert!(rendered.starts_with("1 package failed"));
        assert!(rendered.contains("Package api"));
        assert!(rendered.contains("TS2345"));
    }

    #[test]
    fn render_multiple_failures_counts_packages() {
        let failures = vec![
            TypeCheckFailure {
                package: "api".into(),
                output: "boom\n".into(),
            },
            TypeCheckFailure {
                package: "web".into(),
                output: "bang\n".into(),
            },
        ];
        let rendered = render_failures(&failures);
        assert!(rendered.starts_with("2 packages failed"));
        assert!(rendered.contains("Package api"));
        assert!(rendered.contains("Package web"));
    }

    #[test]
    fn banner_is_centered_between_decorations() {
        let b = banner("core");
        let lines: Vec<_> = b.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].chars().all(|c| c == '='));
        assert!(lines[1].trim_start().starts_with("Package core"));
    }

    #[test]
    fn contains_typescript_for_standalone_package() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{ "name": "x" }"#).unwrap();
        let ctx = ProjectContext::describe(dir.path()).unwrap();
        assert!(!contains_typescript(&ctx));

        std::fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();
        assert!(contains_typescript(&ctx));
    }
}
