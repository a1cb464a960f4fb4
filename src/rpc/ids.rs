//! Process-wide id allocation for bulk-added items.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::model::ItemId;

/// Monotonic id counter shared by every client-streaming call.
///
/// Each call to [`IdAllocator::allocate`] returns a distinct id, so
/// concurrent bulk adds never hand out the same value twice.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicI64,
}

impl IdAllocator {
    /// Create an allocator whose first id is `first`.
    pub fn new(first: ItemId) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }

    /// Take the next id.
    pub fn allocate(&self) -> ItemId {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Id the next call to `allocate` will return.
    pub fn peek(&self) -> ItemId {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}
