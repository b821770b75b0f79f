//! Partial-stage snapshotter.
//!
//! When a file has independently staged and unstaged edits, rewriting it in
//! place would destroy the unstaged half. This crate captures two restore
//! points before any mutation (the index as staged, and the full working
//! copy), resets the working directory to staged content only, and after
//! mutation reconciles: the developer's unstaged edits come back, the index
//! receives the formatted content, and the formatting delta is carried onto
//! the working copy where it does not conflict.
//!
//! State is an explicit tagged value ([`SnapshotState`]) passed back into
//! [`reconcile`]/[`abort`]; there is no hidden shared state between the
//! snapshotter and its caller.

pub mod error;
pub mod snapshotter;
pub mod state;

pub use error::{SnapshotError, SnapshotResult};
pub use snapshotter::{abort, begin_if_needed, mark_formatted, reconcile};
pub use state::{ActiveSnapshot, SnapshotState};
