//! Optional `gatekeep.toml` configuration.
//!
//! Everything has a sensible default; the file exists to point gatekeep at
//! non-standard fixer binaries.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ProjectError, ProjectResult};

const CONFIG_FILE: &str = "gatekeep.toml";

/// Fixer command overrides.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FixerConfig {
    /// Formatter command line; defaults to the project-local prettier.
    pub format_command: Option<String>,
    /// Lint-fixer command line; defaults to the project-local eslint.
    pub lint_command: Option<String>,
}

/// Top-level gatekeep configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GatekeepConfig {
    pub fixers: FixerConfig,
}

impl GatekeepConfig {
    /// Load `gatekeep.toml` from the project root; a missing file yields
    /// the defaults.
    pub fn load(project_root: &Path) -> ProjectResult<Self> {
        let path = project_root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        toml::from_str(&raw).map_err(|e| ProjectError::InvalidConfig {
            path,
            reason: e.to_string(),
        })
    }

    /// Split a configured command line into program and arguments,
    /// falling back to the given default program.
    pub fn resolve_command(
        configured: Option<&str>,
        default_program: PathBuf,
    ) -> (PathBuf, Vec<String>) {
        match configured {
            Some(line) => {
                let mut parts = line.split_whitespace();
                let program = parts.next().map(PathBuf::from).unwrap_or(default_program);
                (program, parts.map(str::to_string).collect())
            }
            None => (default_program, Vec::new()),
        }
    }
}
