//! Per-thread mutual exclusion

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-thread locks
///
/// Clones share the registry. Graphs that persist into the same checkpoint
/// store must share one registry (see
/// [`CompiledGraph::with_thread_locks`](crate::CompiledGraph::with_thread_locks))
/// for the exclusion to hold across them.
#[derive(Debug, Clone, Default)]
pub struct ThreadLocks {
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

/// Held for the duration of a run on one thread
#[derive(Debug)]
pub struct ThreadGuard {
    _guard: OwnedMutexGuard<()>,
}

impl ThreadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other run holds `thread_id`, then hold it
    pub async fn acquire(&self, thread_id: &str) -> ThreadGuard {
        let lock = {
            let mut locks = self.locks.lock();
            // Only the registry references an idle lock
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(thread_id.to_string()).or_default().clone()
        };

        ThreadGuard {
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of threads currently held or awaited
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}
