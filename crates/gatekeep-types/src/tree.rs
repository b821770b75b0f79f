use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Opaque content-addressed handle for a saved tree state.
///
/// A `TreeId` identifies the complete content of all tracked files at one
/// instant. The underlying VCS produces it (`git write-tree` output for the
/// git backend, a BLAKE3 digest for the in-memory backend); gatekeep never
/// interprets it beyond equality. Identical staged content always yields the
/// same `TreeId`, so snapshots are deterministic and deduplicatable.
///
/// Tree ids are transient: they are never persisted across process runs.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreeId(String);

impl TreeId {
    /// Wrap a VCS-produced object id.
    ///
    /// The id must be a non-empty hex-like token with no whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidTreeId(id));
        }
        Ok(Self(id))
    }

    /// The raw object id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short representation (first 8 characters) for logs.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(8)]
    }
}

impl fmt::Debug for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TreeId({})", self.short())
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
