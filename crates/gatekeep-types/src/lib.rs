//! Foundation types for gatekeep.
//!
//! This crate provides the handful of types shared by every other gatekeep
//! crate:
//!
//! - [`TreeId`] — opaque content-addressed handle for a saved tree state
//! - [`MutationOutcome`] / [`FileOutcome`] — per-file result of the mutation
//!   pipeline
//! - [`CleanupRegistry`] — process-exit recovery callbacks, drained exactly
//!   once on interruption

pub mod cleanup;
pub mod error;
pub mod outcome;
pub mod tree;

pub use cleanup::{CleanupHandle, CleanupRegistry};
pub use error::TypeError;
pub use outcome::{FileOutcome, MutationOutcome};
pub use tree::TreeId;
