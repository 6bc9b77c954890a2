use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// A monotonically reported integer count. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    count: Arc<AtomicI64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self, n: i64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn dec(&self, n: i64) {
        self.count.fetch_sub(n, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
    }

    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }
}
