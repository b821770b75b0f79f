use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gatekeep_types::TreeId;

use crate::error::VcsResult;

/// Primitive version-control operations used by the partial-stage workflow.
///
/// All implementations must satisfy these invariants:
/// - A tree snapshot, once written, is immutable; [`Vcs::write_tree`] is
///   deterministic for identical staged content (content addressing, not
///   wall-clock based).
/// - [`Vcs::read_tree`] touches the index only; [`Vcs::checkout_index`]
///   unconditionally overwrites working-directory content for every indexed
///   path. The pair is only ever driven with trusted prior snapshots, so
///   clobbering local modifications is accepted.
/// - [`Vcs::apply_delta_best_effort`] drops hunks that no longer apply;
///   developer edits win over fixer output. A dropped hunk is never an
///   error, and no reject artifacts are left behind.
/// - Index mutation ([`Vcs::stage_file`], [`Vcs::add_all`]) must be safe
///   under concurrent invocation for distinct paths; backends whose
///   underlying primitive is not concurrency-safe serialize these calls
///   internally while leaving read-only operations concurrent.
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Returns `true` if the working directory is inside a repository.
    ///
    /// Fails closed: any inability to detect a repository yields `false`.
    async fn is_repository(&self) -> bool;

    /// Absolute paths of files whose staged content differs from the last
    /// commit, filtered to added/copied/modified statuses (not deleted).
    async fn staged_files(&self) -> VcsResult<Vec<PathBuf>>;

    /// Returns `true` if the working tree has any modification relative to
    /// the index, tracked or untracked.
    async fn has_changes(&self) -> VcsResult<bool>;

    /// Returns `true` if at least one file has independently staged and
    /// unstaged modifications relative to the last commit.
    async fn has_partially_staged_files(&self) -> VcsResult<bool>;

    /// Capture a content-addressed snapshot of the current index.
    async fn write_tree(&self) -> VcsResult<TreeId>;

    /// Stage every change in the working directory.
    async fn add_all(&self) -> VcsResult<()>;

    /// Load a snapshot into the index. The working directory is untouched.
    async fn read_tree(&self, tree: &TreeId) -> VcsResult<()>;

    /// Force-sync index content to the working directory, overwriting local
    /// modifications for every indexed path.
    async fn checkout_index(&self) -> VcsResult<()>;

    /// Apply the delta between two snapshots to the working directory,
    /// hunk by hunk. Hunks conflicting with content already present are
    /// silently dropped.
    async fn apply_delta_best_effort(&self, old: &TreeId, new: &TreeId) -> VcsResult<()>;

    /// Stage a single file's current working-directory content.
    async fn stage_file(&self, path: &Path) -> VcsResult<()>;

    /// The repository's working-directory root.
    fn workdir(&self) -> &Path;
}
