//! CPU core allocation for heavy subprocesses.
//!
//! In-flight heavy processes are bounded to the host's logical CPU count;
//! excess requests queue in submission order and are released FIFO as
//! running processes complete (tokio's semaphore is fair).

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounded allocator for CPU-heavy subprocess slots.
#[derive(Clone)]
pub struct CoreAllocator {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// One allocated core; the slot frees when the permit drops.
pub struct CorePermit {
    _permit: OwnedSemaphorePermit,
}

impl CoreAllocator {
    /// Allocator sized to the host's logical CPU count.
    pub fn new() -> Self {
        let cores = std::thread::available_parallelism()
            .map(usize::from)
            .unwrap_or(1);
        Self::with_capacity(cores)
    }

    /// Allocator with an explicit slot count.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity.max(1))),
            capacity: capacity.max(1),
        }
    }

    /// Wait for a free slot.
    pub async fn allocate(&self) -> CorePermit {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .expect("allocator semaphore closed");
        CorePermit { _permit: permit }
    }

    /// Total slot count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Currently free slots.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Default for CoreAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn allocation_is_bounded_by_capacity() {
        let allocator = CoreAllocator::with_capacity(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let allocator = allocator.clone();
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                let _permit = allocator.allocate().await;
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn permits_free_on_drop() {
        let allocator = CoreAllocator::with_capacity(1);
        assert_eq!(allocator.available(), 1);

        let permit = allocator.allocate().await;
        assert_eq!(allocator.available(), 0);

        drop(permit);
        assert_eq!(allocator.available(), 1);
    }

    #[tokio::test]
    async fn waiters_are_released_in_submission_order() {
        let allocator = CoreAllocator::with_capacity(1);
        let blocker = allocator.allocate().await;

        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for label in 0..3 {
            let allocator = allocator.clone();
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                let _permit = allocator.allocate().await;
                order.lock().unwrap().push(label);
            }));
            // Let each waiter enqueue before spawning the next.
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        drop(blocker);
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn capacity_is_at_least_one() {
        assert_eq!(CoreAllocator::with_capacity(0).capacity(), 1);
    }
}
