use gatekeep_types::{CleanupHandle, TreeId};

/// A begun snapshot: two read-only restore points plus, after mutation,
/// the formatted index tree.
#[derive(Debug)]
pub struct ActiveSnapshot {
    /// The index exactly as staged, before mutation.
    pub index_tree: TreeId,
    /// The full working copy (staged + unstaged + untracked), before
    /// mutation.
    pub working_copy_tree: TreeId,
    /// The index after mutation; set by `mark_formatted` iff anything was
    /// rewritten.
    pub formatted_index_tree: Option<TreeId>,
    /// Registry handle for the working-copy restore callback.
    pub(crate) cleanup: CleanupHandle,
}

/// Whether the partial-stage machinery is engaged for this run.
#[derive(Debug)]
pub enum SnapshotState {
    /// No file is partially staged; mutation happens directly against the
    /// single working tree.
    NoSnapshot,
    /// Restore points are saved and the working directory holds staged
    /// content only.
    Active(ActiveSnapshot),
}

impl SnapshotState {
    /// Returns `true` if restore points were captured.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}
