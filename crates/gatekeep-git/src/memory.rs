//! In-memory [`Vcs`] implementation.
//!
//! Keeps the last-commit state, the index, and every tree snapshot in
//! memory (content-addressed with BLAKE3) while operating on a real
//! working directory on disk. Semantics mirror [`crate::GitVcs`]; the
//! best-effort delta goes through [`crate::patch`]. Intended for tests
//! and embedding.
//!
//! Content is held as UTF-8 text; the fixer workflow only ever rewrites
//! text files.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use gatekeep_types::TreeId;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{VcsError, VcsResult};
use crate::patch::{apply_hunks_best_effort, compute_hunks};
use crate::traits::Vcs;

type FileMap = BTreeMap<String, String>;

struct MemState {
    /// Content as of the last commit.
    head: FileMap,
    /// Content as staged.
    index: FileMap,
    /// Saved tree snapshots, keyed by content-addressed id.
    trees: HashMap<TreeId, FileMap>,
}

/// In-memory index and object store over a real working directory.
pub struct MemoryVcs {
    root: PathBuf,
    state: Mutex<MemState>,
}

impl MemoryVcs {
    /// Create an empty repository rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: Mutex::new(MemState {
                head: BTreeMap::new(),
                index: BTreeMap::new(),
                trees: HashMap::new(),
            }),
        }
    }

    /// Write a file to disk and record it as committed (head, index and
    /// working directory all agree).
    pub fn commit_file(&self, rel: &str, content: &str) -> VcsResult<()> {
        self.write_disk(rel, content)?;
        let mut state = self.state.lock().expect("vcs lock poisoned");
        state.head.insert(rel.to_string(), content.to_string());
        state.index.insert(rel.to_string(), content.to_string());
        Ok(())
    }

    /// Write a file to disk without touching head or index.
    pub fn write_file(&self, rel: &str, content: &str) -> VcsResult<()> {
        self.write_disk(rel, content)
    }

    /// The staged content of a file, if any.
    pub fn index_content(&self, rel: &str) -> Option<String> {
        self.state
            .lock()
            .expect("vcs lock poisoned")
            .index
            .get(rel)
            .cloned()
    }

    /// The on-disk content of a file, if present and readable.
    pub fn disk_content(&self, rel: &str) -> Option<String> {
        std::fs::read_to_string(self.root.join(rel)).ok()
    }

    /// Number of tree snapshots captured so far.
    pub fn tree_count(&self) -> usize {
        self.state.lock().expect("vcs lock poisoned").trees.len()
    }

    fn write_disk(&self, rel: &str, content: &str) -> VcsResult<()> {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    fn rel(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned()
    }

    /// Snapshot of every readable text file under the root.
    fn disk_files(&self) -> FileMap {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let content = std::fs::read_to_string(e.path()).ok()?;
                Some((self.rel(e.path()), content))
            })
            .collect()
    }

    fn tree_id_for(files: &FileMap) -> TreeId {
        let mut hasher = blake3::Hasher::new();
        for (path, content) in files {
            hasher.update(path.as_bytes());
            hasher.update(&[0]);
            hasher.update(&(content.len() as u64).to_le_bytes());
            hasher.update(content.as_bytes());
        }
        TreeId::new(hex::encode(hasher.finalize().as_bytes())).expect("hex id is well-formed")
    }
}

impl std::fmt::Debug for MemoryVcs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().expect("vcs lock poisoned");
        f.debug_struct("MemoryVcs")
            .field("root", &self.root)
            .field("tracked", &state.index.len())
            .field("trees", &state.trees.len())
            .finish()
    }
}

#[async_trait]
impl Vcs for MemoryVcs {
    async fn is_repository(&self) -> bool {
        true
    }

    async fn staged_files(&self) -> VcsResult<Vec<PathBuf>> {
        let state = self.state.lock().expect("vcs lock poisoned");
        Ok(state
            .index
            .iter()
            .filter(|(path, content)| state.head.get(path.as_str()) != Some(content))
            .map(|(path, _)| self.root.join(path))
            .collect())
    }

    async fn has_changes(&self) -> VcsResult<bool> {
        let disk = self.disk_files();
        let state = self.state.lock().expect("vcs lock poisoned");
        Ok(disk != state.index)
    }

    async fn has_partially_staged_files(&self) -> VcsResult<bool> {
        let disk = self.disk_files();
        let state = self.state.lock().expect("vcs lock poisoned");

        let tracked: BTreeSet<&String> = state.index.keys().chain(state.head.keys()).collect();
        let partially_staged = tracked.into_iter().any(|path| {
            let index_changed = state.index.get(path) != state.head.get(path);
            let worktree_changed = disk.get(path) != state.index.get(path);
            index_changed && worktree_changed
        });
        Ok(partially_staged)
    }

    async fn write_tree(&self) -> VcsResult<TreeId> {
        let mut state = self.state.lock().expect("vcs lock poisoned");
        let id = Self::tree_id_for(&state.index);
        let files = state.index.clone();
        state.trees.entry(id.clone()).or_insert(files);
        Ok(id)
    }

    async fn add_all(&self) -> VcsResult<()> {
        let disk = self.disk_files();
        let mut state = self.state.lock().expect("vcs lock poisoned");
        state.index = disk;
        Ok(())
    }

    async fn read_tree(&self, tree: &TreeId) -> VcsResult<()> {
        let mut state = self.state.lock().expect("vcs lock poisoned");
        let files = state
            .trees
            .get(tree)
            .cloned()
            .ok_or_else(|| VcsError::UnknownTree(tree.to_string()))?;
        state.index = files;
        Ok(())
    }

    async fn checkout_index(&self) -> VcsResult<()> {
        let index = {
            let state = self.state.lock().expect("vcs lock poisoned");
            state.index.clone()
        };
        // Files not in the index are left alone, matching checkout-index.
        for (path, content) in &index {
            self.write_disk(path, content)?;
        }
        Ok(())
    }

    async fn apply_delta_best_effort(&self, old: &TreeId, new: &TreeId) -> VcsResult<()> {
        let (old_files, new_files) = {
            let state = self.state.lock().expect("vcs lock poisoned");
            let old_files = state
                .trees
                .get(old)
                .cloned()
                .ok_or_else(|| VcsError::UnknownTree(old.to_string()))?;
            let new_files = state
                .trees
                .get(new)
                .cloned()
                .ok_or_else(|| VcsError::UnknownTree(new.to_string()))?;
            (old_files, new_files)
        };

        let paths: BTreeSet<&String> = old_files.keys().chain(new_files.keys()).collect();
        for path in paths {
            let old_content = old_files.get(path);
            let new_content = new_files.get(path);
            if old_content == new_content {
                continue;
            }

            let disk = self.disk_content(path);
            match (old_content, new_content, disk) {
                // Modified in the delta: splice hunks into whatever is on
                // disk now, dropping those that no longer fit.
                (Some(old_c), Some(new_c), Some(disk_c)) => {
                    let hunks = compute_hunks(old_c, new_c);
                    let (result, report) = apply_hunks_best_effort(&disk_c, &hunks);
                    if report.dropped > 0 {
                        debug!(path = %path, dropped = report.dropped, "dropped conflicting hunks");
                    }
                    if result != disk_c {
                        self.write_disk(path, &result)?;
                    }
                }
                // Added in the delta: only materialize onto a path the
                // developer has not claimed.
                (None, Some(new_c), None) => self.write_disk(path, new_c)?,
                (None, Some(_), Some(_)) => {
                    debug!(path = %path, "dropping added file; path already exists locally");
                }
                // Deleted in the delta: only delete untouched content.
                (Some(old_c), None, Some(disk_c)) if disk_c == *old_c => {
                    std::fs::remove_file(self.root.join(path))?;
                }
                (Some(_), None, Some(_)) => {
                    debug!(path = %path, "dropping deletion; local content differs");
                }
                (_, _, None) => {
                    debug!(path = %path, "dropping hunk; file missing locally");
                }
                // No change in the delta (old == new); skipped above by the
                // `continue`, so this is unreachable in practice.
                (None, None, Some(_)) => {}
            }
        }
        Ok(())
    }

    async fn stage_file(&self, path: &Path) -> VcsResult<()> {
        let rel = self.rel(path);
        let content = std::fs::read_to_string(self.root.join(&rel))?;
        let mut state = self.state.lock().expect("vcs lock poisoned");
        state.index.insert(rel, content);
        Ok(())
    }

    fn workdir(&self) -> &Path {
        &self.root
    }
}
