//! Snapshot lifecycle: begin, mark formatted, reconcile, abort.

use std::sync::Arc;

use gatekeep_git::Vcs;
use gatekeep_types::{CleanupRegistry, TreeId};
use tracing::{debug, error};

use crate::error::SnapshotResult;
use crate::state::{ActiveSnapshot, SnapshotState};

/// Capture restore points if any file is partially staged.
///
/// Returns [`SnapshotState::NoSnapshot`] when nothing is partially staged.
/// Otherwise saves the index tree, stages the entire working directory to
/// capture the working-copy tree, registers the working-copy restore
/// callback with `registry`, and resets index and working directory back to
/// staged content so mutation sees only what will be committed.
///
/// The callback is registered before the reset, so an interruption at any
/// later point restores the pre-workflow working copy.
pub async fn begin_if_needed(
    vcs: &Arc<dyn Vcs>,
    registry: &CleanupRegistry,
) -> SnapshotResult<SnapshotState> {
    if !vcs.has_partially_staged_files().await? {
        return Ok(SnapshotState::NoSnapshot);
    }

    debug!("partially staged files present; saving restore points");
    let index_tree = vcs.write_tree().await?;
    vcs.add_all().await?;
    let working_copy_tree = vcs.write_tree().await?;

    let cleanup = registry.register({
        let vcs = Arc::clone(vcs);
        let tree = working_copy_tree.clone();
        move || {
            let vcs = Arc::clone(&vcs);
            let tree = tree.clone();
            async move { restore_working_copy(vcs.as_ref(), &tree).await }
        }
    });

    vcs.read_tree(&index_tree).await?;
    vcs.checkout_index().await?;

    Ok(SnapshotState::Active(ActiveSnapshot {
        index_tree,
        working_copy_tree,
        formatted_index_tree: None,
        cleanup,
    }))
}

/// Record the post-mutation index tree. Call once, after mutation completed
/// and iff at least one file was rewritten. A no-op without an active
/// snapshot.
pub async fn mark_formatted(
    vcs: &Arc<dyn Vcs>,
    state: &mut SnapshotState,
) -> SnapshotResult<()> {
    if let SnapshotState::Active(snapshot) = state {
        snapshot.formatted_index_tree = Some(vcs.write_tree().await?);
    }
    Ok(())
}

/// Restore the developer's working copy and install the final index.
///
/// Restores the working directory from the working-copy tree first, then
/// the index: back to the original index tree when nothing was rewritten,
/// or to the formatted tree with the formatting delta carried best-effort
/// onto the working copy. Conflicting hunks are dropped, never an error.
/// Deregisters the restore callback on success.
pub async fn reconcile(
    vcs: &Arc<dyn Vcs>,
    registry: &CleanupRegistry,
    state: SnapshotState,
) -> SnapshotResult<()> {
    let SnapshotState::Active(snapshot) = state else {
        return Ok(());
    };

    debug!(
        working_copy = %snapshot.working_copy_tree.short(),
        "restoring working copy"
    );
    vcs.read_tree(&snapshot.working_copy_tree).await?;
    vcs.checkout_index().await?;

    match &snapshot.formatted_index_tree {
        None => {
            debug!(index = %snapshot.index_tree.short(), "restoring original index");
            vcs.read_tree(&snapshot.index_tree).await?;
        }
        Some(formatted) => {
            debug!(index = %formatted.short(), "restoring formatted index");
            vcs.read_tree(formatted).await?;
            vcs.apply_delta_best_effort(&snapshot.index_tree, formatted)
                .await?;
        }
    }

    registry.deregister(snapshot.cleanup);
    Ok(())
}

/// Recovery path for an unrecoverable mid-workflow error: restore the
/// working copy, discarding any formatting. The index ends up mirroring the
/// working-copy tree. Deregisters the restore callback.
pub async fn abort(
    vcs: &Arc<dyn Vcs>,
    registry: &CleanupRegistry,
    state: SnapshotState,
) -> SnapshotResult<()> {
    let SnapshotState::Active(snapshot) = state else {
        return Ok(());
    };

    vcs.read_tree(&snapshot.working_copy_tree).await?;
    vcs.checkout_index().await?;
    registry.deregister(snapshot.cleanup);
    Ok(())
}

/// Unconditional working-copy restore used by the exit path. Errors are
/// logged, not propagated: the process is already going down.
async fn restore_working_copy(vcs: &dyn Vcs, tree: &TreeId) {
    if let Err(err) = vcs.read_tree(tree).await {
        error!(%err, "failed to restore working copy tree");
        return;
    }
    if let Err(err) = vcs.checkout_index().await {
        error!(%err, "failed to sync restored tree to disk");
    }
}
