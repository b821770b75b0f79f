//! Git-backed [`Vcs`] implementation.
//!
//! Shells out to the `git` binary via `tokio::process`. Tree snapshots map
//! onto `write-tree` / `read-tree` / `checkout-index`, the best-effort
//! delta onto `diff-tree` piped into `apply --reject`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use gatekeep_types::TreeId;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{VcsError, VcsResult};
use crate::status::any_partially_staged;
use crate::traits::Vcs;

/// Production VCS adapter over the `git` binary.
pub struct GitVcs {
    root: PathBuf,
    /// The git index is not safe under concurrent mutation; all index
    /// writes serialize on this lock. Read-only commands stay concurrent.
    index_lock: Mutex<()>,
}

impl GitVcs {
    /// Create an adapter rooted at the given working directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_lock: Mutex::new(()),
        }
    }

    async fn exec(&self, args: &[&str]) -> VcsResult<String> {
        debug!(?args, "git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .output()
            .await?;
        Self::finish("git", args, output)
    }

    async fn exec_with_stdin(&self, args: &[&str], input: &str) -> VcsResult<String> {
        debug!(?args, "git (with stdin)");
        let mut child = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes()).await?;
        }
        let output = child.wait_with_output().await?;
        Self::finish("git", args, output)
    }

    fn finish(
        program: &str,
        args: &[&str],
        output: std::process::Output,
    ) -> VcsResult<String> {
        let command = format!("{program} {}", args.join(" "));
        if !output.status.success() {
            return Err(VcsError::CommandFailed {
                command,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        String::from_utf8(output.stdout).map_err(|e| VcsError::InvalidOutput {
            command,
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl Vcs for GitVcs {
    async fn is_repository(&self) -> bool {
        self.exec(&["rev-parse", "--git-dir"]).await.is_ok()
    }

    async fn staged_files(&self) -> VcsResult<Vec<PathBuf>> {
        let stdout = self
            .exec(&["diff", "--staged", "--diff-filter=ACM", "--name-only"])
            .await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| self.root.join(line))
            .collect())
    }

    async fn has_changes(&self) -> VcsResult<bool> {
        let stdout = self.exec(&["status", "--porcelain", "-uall"]).await?;
        Ok(!stdout.trim().is_empty())
    }

    async fn has_partially_staged_files(&self) -> VcsResult<bool> {
        let stdout = self.exec(&["status", "--porcelain"]).await?;
        Ok(any_partially_staged(&stdout))
    }

    async fn write_tree(&self) -> VcsResult<TreeId> {
        let stdout = self.exec(&["write-tree"]).await?;
        Ok(TreeId::new(stdout.trim())?)
    }

    async fn add_all(&self) -> VcsResult<()> {
        let _guard = self.index_lock.lock().await;
        self.exec(&["add", "."]).await?;
        Ok(())
    }

    async fn read_tree(&self, tree: &TreeId) -> VcsResult<()> {
        let _guard = self.index_lock.lock().await;
        self.exec(&["read-tree", tree.as_str()]).await?;
        Ok(())
    }

    async fn checkout_index(&self) -> VcsResult<()> {
        self.exec(&["checkout-index", "-a", "-f"]).await?;
        Ok(())
    }

    async fn apply_delta_best_effort(&self, old: &TreeId, new: &TreeId) -> VcsResult<()> {
        let diff = self
            .exec(&[
                "diff-tree",
                "--ignore-submodules",
                "--binary",
                "--no-color",
                "--no-ext-diff",
                "--unified=0",
                old.as_str(),
                new.as_str(),
            ])
            .await?;
        if diff.trim().is_empty() {
            return Ok(());
        }

        // git-apply refuses patches that do not end with a newline.
        let patch = format!("{diff}\n");
        let result = self
            .exec_with_stdin(
                &[
                    "apply",
                    "--whitespace=nowarn",
                    "--reject",
                    "--recount",
                    "--unidiff-zero",
                ],
                &patch,
            )
            .await;

        if let Err(err) = result {
            // Rejected hunks mean the fixer's changes conflict with the
            // developer's unstaged edits; the developer wins.
            debug!(%err, "patch did not apply cleanly; dropping conflicting hunks");
            remove_reject_files(&self.root);
        }
        Ok(())
    }

    async fn stage_file(&self, path: &Path) -> VcsResult<()> {
        let _guard = self.index_lock.lock().await;
        let path = path.to_string_lossy().into_owned();
        self.exec(&["add", "--", path.as_str()]).await?;
        Ok(())
    }

    fn workdir(&self) -> &Path {
        &self.root
    }
}

/// Delete `*.rej` artifacts left behind by a partial `git apply --reject`.
///
/// Rejected hunks come from the fixer, so their leftovers are irrelevant;
/// the working tree must stay free of them.
pub(crate) fn remove_reject_files(root: &Path) {
    let rejects = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git")
        .filter_map(Result::ok)
        .filter(|e| {
            e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "rej")
        });

    for entry in rejects {
        if let Err(err) = std::fs::remove_file(entry.path()) {
            warn!(path = %entry.path().display(), %err, "failed to delete reject artifact");
        } else {
            debug!(path = %entry.path().display(), "deleted reject artifact");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_sweep_removes_only_rej_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        std::fs::write(root.join("app.ts"), "code").unwrap();
        std::fs::write(root.join("app.ts.rej"), "rejected hunk").unwrap();
        std::fs::create_dir(root.join("nested")).unwrap();
        std::fs::write(root.join("nested/lib.ts.rej"), "rejected hunk").unwrap();

        remove_reject_files(root);

        assert!(root.join("app.ts").exists());
        assert!(!root.join("app.ts.rej").exists());
        assert!(!root.join("nested/lib.ts.rej").exists());
    }

    #[test]
    fn reject_sweep_skips_git_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        std::fs::create_dir(root.join(".git")).unwrap();
        std::fs::write(root.join(".git/something.rej"), "internal").unwrap();

        remove_reject_files(root);
        assert!(root.join(".git/something.rej").exists());
    }
}
