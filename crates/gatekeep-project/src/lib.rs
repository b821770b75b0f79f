//! Project context detection and configuration.
//!
//! Gatekeep runs against a JS/TS project: a standalone package, a monorepo
//! root, or a single package inside a monorepo. [`ProjectContext::describe`]
//! figures out which, starting from the working directory's `package.json`.
//! [`GatekeepConfig`] layers optional `gatekeep.toml` settings on top.

pub mod config;
pub mod context;
pub mod error;

pub use config::{FixerConfig, GatekeepConfig};
pub use context::{PackageManager, ProjectContext, ProjectKind};
pub use error::{ProjectError, ProjectResult};
