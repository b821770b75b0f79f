//! Process-exit recovery callbacks.
//!
//! While a tree snapshot exists, the workflow registers a callback that
//! restores the developer's working copy. If the process is interrupted
//! before normal reconciliation, the exit path drains the registry and
//! awaits every pending callback, so the working tree is never left in the
//! intermediate "index-reset" state.
//!
//! The registry is constructor-injected and owned by the process entry
//! point; there is no process-wide singleton.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::debug;

type CleanupFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type CleanupFn = Box<dyn Fn() -> CleanupFuture + Send + Sync>;

/// Handle returned by [`CleanupRegistry::register`]; pass it back to
/// [`CleanupRegistry::deregister`] after a normal completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CleanupHandle(u64);

/// A keyed set of zero-argument recovery callbacks.
///
/// Invariants:
/// - `run_all` removes each callback before invoking it, so a second
///   `run_all` (or a racing one) never runs a callback twice.
/// - Callbacks run in registration order and are awaited to completion.
/// - Deregistering a handle that already ran (or never existed) is a no-op.
pub struct CleanupRegistry {
    callbacks: Mutex<BTreeMap<u64, CleanupFn>>,
    next_id: AtomicU64,
}

impl CleanupRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a recovery callback; returns a handle for deregistration.
    pub fn register<F, Fut>(&self, callback: F) -> CleanupHandle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let boxed: CleanupFn = Box::new(move || Box::pin(callback()));
        self.callbacks
            .lock()
            .expect("cleanup lock poisoned")
            .insert(id, boxed);
        CleanupHandle(id)
    }

    /// Remove a callback after normal completion.
    ///
    /// Returns `true` if the callback was still pending.
    pub fn deregister(&self, handle: CleanupHandle) -> bool {
        self.callbacks
            .lock()
            .expect("cleanup lock poisoned")
            .remove(&handle.0)
            .is_some()
    }

    /// Number of pending callbacks.
    pub fn len(&self) -> usize {
        self.callbacks.lock().expect("cleanup lock poisoned").len()
    }

    /// Returns `true` if no callbacks are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain and await every pending callback, in registration order.
    ///
    /// Entries are removed under the lock before any callback runs; a
    /// concurrent `run_all` or `deregister` therefore observes an already
    /// empty registry instead of re-running work.
    pub async fn run_all(&self) {
        let drained: Vec<(u64, CleanupFn)> = {
            let mut map = self.callbacks.lock().expect("cleanup lock poisoned");
            std::mem::take(&mut *map).into_iter().collect()
        };

        if drained.is_empty() {
            return;
        }

        debug!(count = drained.len(), "running cleanup callbacks");
        for (_, callback) in drained {
            callback().await;
        }
    }
}

impl Default for CleanupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CleanupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupRegistry")
            .field("pending", &self.len())
            .finish()
    }
}
