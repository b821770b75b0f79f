//! The pre-commit gate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gatekeep_fix::{FixerSet, MutationPipeline};
use gatekeep_git::Vcs;
use gatekeep_snapshot::{abort, begin_if_needed, mark_formatted, reconcile};
use gatekeep_types::outcome::failure_messages;
use gatekeep_types::{CleanupRegistry, MutationOutcome};
use tracing::{debug, warn};

use crate::error::{WorkflowError, WorkflowResult};

/// Summary of a successful pre-commit run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreCommitReport {
    /// Staged files handed to the pipeline.
    pub processed: usize,
    /// Files that were rewritten and re-staged.
    pub rewritten: Vec<PathBuf>,
}

/// Run the pre-commit workflow: snapshot partial stages, mutate every
/// staged file concurrently, reconcile, and aggregate the result.
///
/// Reconciliation runs whether or not files failed: some files may have
/// been rewritten and staged before another failed, and the working tree
/// must be left consistent either way. Only the final pass/fail signal
/// differs.
pub async fn run_pre_commit(
    vcs: Arc<dyn Vcs>,
    fixers: FixerSet,
    project_root: &Path,
    registry: &CleanupRegistry,
) -> WorkflowResult<PreCommitReport> {
    let staged = vcs.staged_files().await?;
    if staged.is_empty() {
        debug!("no staged files; nothing to do");
        return Ok(PreCommitReport::default());
    }
    let processed = staged.len();

    let mut state = begin_if_needed(&vcs, registry).await?;

    let pipeline = Arc::new(MutationPipeline::new(
        Arc::clone(&vcs),
        fixers,
        project_root,
    ));
    let outcomes = pipeline.run(staged).await;

    let messages = failure_messages(&outcomes);
    let rewritten: Vec<PathBuf> = outcomes
        .iter()
        .filter(|o| o.outcome == MutationOutcome::Rewritten)
        .map(|o| o.path.clone())
        .collect();

    if messages.is_empty() && !rewritten.is_empty() {
        if let Err(err) = mark_formatted(&vcs, &mut state).await {
            // Unrecoverable: put the working copy back and bail.
            if let Err(abort_err) = abort(&vcs, registry, state).await {
                warn!(%abort_err, "abort after snapshot failure also failed");
            }
            return Err(err.into());
        }
    }

    reconcile(&vcs, registry, state).await?;

    if messages.is_empty() {
        Ok(PreCommitReport {
            processed,
            rewritten,
        })
    } else {
        Err(WorkflowError::Checks { messages })
    }
}
