//! Per-transform ignore resolution.
//!
//! Lint and format exclusion are independent policies: a file may be
//! excluded from one but not the other. Each resolves a single ignore file
//! with fixed precedence (the tool-specific ignore file, then the shared
//! project ignore file, then the generic VCS ignore file) and matches
//! paths against it with gitignore semantics.

use std::path::{Path, PathBuf};

use tracing::warn;

/// Which transform an ignore policy applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreKind {
    Lint,
    Format,
}

impl IgnoreKind {
    fn tool_file(&self) -> &'static str {
        match self {
            Self::Lint => ".eslintignore",
            Self::Format => ".prettierignore",
        }
    }
}

/// Resolve the ignore file for a transform kind, if any.
pub fn find_ignore_file(project_root: &Path, kind: IgnoreKind) -> Option<PathBuf> {
    [kind.tool_file(), ".gatekeepignore", ".gitignore"]
        .iter()
        .map(|name| project_root.join(name))
        .find(|path| path.exists())
}

/// Matches paths against one resolved ignore file.
pub struct IgnoreMatcher {
    gitignore: Option<ignore::gitignore::Gitignore>,
}

impl IgnoreMatcher {
    /// Build the matcher for a transform kind. A missing or unparsable
    /// ignore file means nothing is excluded.
    pub fn for_kind(project_root: &Path, kind: IgnoreKind) -> Self {
        let Some(file) = find_ignore_file(project_root, kind) else {
            return Self { gitignore: None };
        };

        let mut builder = ignore::gitignore::GitignoreBuilder::new(project_root);
        if let Some(err) = builder.add(&file) {
            warn!(file = %file.display(), %err, "ignoring unreadable ignore file");
            return Self { gitignore: None };
        }
        match builder.build() {
            Ok(gitignore) => Self {
                gitignore: Some(gitignore),
            },
            Err(err) => {
                warn!(file = %file.display(), %err, "ignoring invalid ignore file");
                Self { gitignore: None }
            }
        }
    }

    /// A matcher that excludes nothing.
    pub fn allow_all() -> Self {
        Self { gitignore: None }
    }

    /// Returns `true` if the path is excluded.
    pub fn is_ignored(&self, path: &Path) -> bool {
        match &self.gitignore {
            Some(gitignore) => gitignore
                .matched_path_or_any_parents(path, false)
                .is_ignore(),
            None => false,
        }
    }
}
