//! File mutation pipeline.
//!
//! For each staged file: decide which transforms apply (by file kind and
//! per-transform ignore rules), run the lint fixer and then the formatter,
//! and write + re-stage the result if it changed. Files are processed
//! independently and concurrently; one file's failure never stops the
//! others.

pub mod command;
pub mod error;
pub mod fixer;
pub mod ignore_rules;
pub mod kind;
pub mod pipeline;
pub mod stub;

pub use command::{CommandFormatter, CommandLinter};
pub use error::{FixError, FixResult};
pub use fixer::{FormatOutcome, Formatter, LintReport, Linter};
pub use ignore_rules::{find_ignore_file, IgnoreKind, IgnoreMatcher};
pub use kind::FileKind;
pub use pipeline::{FixerSet, MutationPipeline};
