//! Heavy checks: type-checking and dependency-lock integrity.
//!
//! Both launch external tools. Anything CPU-bound goes through the
//! [`CoreAllocator`], which bounds in-flight subprocesses to the host's
//! logical CPU count with FIFO queueing.

pub mod cpu;
pub mod error;
pub mod lockfile;
pub mod typecheck;

pub use cpu::{CoreAllocator, CorePermit};
pub use error::{CheckError, CheckResult};
pub use lockfile::{check_audit, check_lock_integrity, fix_audit, fix_lock_duplicates};
pub use typecheck::{contains_typescript, run_type_check, TypeCheckFailure};
