//! Dependency-lock integrity and audit checks.
//!
//! Thin runners over the detected package manager. Failures carry the
//! tool's output plus a remediation hint.

use std::path::Path;

use gatekeep_project::{PackageManager, ProjectContext};
use tracing::debug;

use crate::error::{CheckError, CheckResult};

/// Verify that the lockfile matches installed dependencies.
///
/// Yarn projects run `yarn check --integrity`, npm projects
/// `npm audit signatures`. Projects without a recognized lockfile pass
/// trivially.
pub async fn check_lock_integrity(ctx: &ProjectContext) -> CheckResult<()> {
    let (program, args) = match ctx.package_manager() {
        PackageManager::Yarn => ("yarn", ["check", "--integrity"].as_slice()),
        PackageManager::Npm => ("npm", ["audit", "signatures"].as_slice()),
        PackageManager::Unknown => {
            debug!("no recognized lockfile; skipping integrity check");
            return Ok(());
        }
    };

    let output = run_tool(program, args, &ctx.project_root).await?;
    if output.status.success() {
        return Ok(());
    }
    Err(CheckError::Integrity {
        output: String::from_utf8_lossy(&output.stderr).into_owned(),
        hint: integrity_hint(ctx.package_manager()),
    })
}

/// Run the package audit without fixing anything.
pub async fn check_audit(ctx: &ProjectContext) -> CheckResult<()> {
    let output = run_tool("npm", &["audit"], &ctx.project_root).await?;
    if output.status.success() {
        return Ok(());
    }
    Err(CheckError::Audit {
        message: format!(
            "npm audit reported problems:\n{}",
            String::from_utf8_lossy(&output.stdout)
        ),
    })
}

/// Run the package audit with auto-fix.
pub async fn fix_audit(ctx: &ProjectContext) -> CheckResult<()> {
    let output = run_tool("npm", &["audit", "fix"], &ctx.project_root).await?;
    if output.status.success() {
        return Ok(());
    }
    Err(CheckError::Audit {
        message: "Failed to run npm audit fix!".into(),
    })
}

/// Deduplicate lockfile dependencies.
pub async fn fix_lock_duplicates(ctx: &ProjectContext) -> CheckResult<()> {
    let output = run_tool("npm", &["dedup"], &ctx.project_root).await?;
    if output.status.success() {
        return Ok(());
    }
    Err(CheckError::Audit {
        message: "Failed to deduplicate lockfile dependencies!".into(),
    })
}

async fn run_tool(
    program: &str,
    args: &[&str],
    cwd: &Path,
) -> CheckResult<std::process::Output> {
    debug!(program, ?args, "running package-manager tool");
    tokio::process::Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .await
        .map_err(|err| CheckError::Tool {
            command: format!("{program} {}", args.join(" ")),
            message: err.to_string(),
        })
}

/// Remediation hint shown under a failed integrity check.
pub fn integrity_hint(manager: PackageManager) -> String {
    let install = match manager {
        PackageManager::Yarn => "yarn install",
        _ => "npm install",
    };
    format!(
        "Error could be caused by an outdated lockfile.\n\
         Please check that all dependencies are correctly installed by running `{install}`."
    )
}
