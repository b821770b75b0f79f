//! Workflow coordination.
//!
//! [`run_pre_commit`] is the pre-commit gate: snapshot partial stages,
//! mutate every staged file concurrently, reconcile, and report one
//! aggregate result. Cleanup is guaranteed exactly once even under
//! interruption, via the injected [`gatekeep_types::CleanupRegistry`].
//!
//! The checkup module runs whole-project lint and format passes for the
//! on-demand `checkup` command.

pub mod checkup;
pub mod coordinator;
pub mod error;

pub use checkup::{run_format_all, run_lint_all};
pub use coordinator::{run_pre_commit, PreCommitReport};
pub use error::{WorkflowError, WorkflowResult};
