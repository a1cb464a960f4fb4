//! Record store subsystem.
//!
//! # Data Flow
//! ```text
//! RPC handlers
//!     → RecordStore (find / insert / update / delete / scan)
//!     → memory.rs (dashmap keyed by item id)
//! ```
//!
//! # Design Decisions
//! - Key uniqueness is the store's job, not the caller's
//! - Per-key consistency only; no multi-record transactions
//! - Scans are lazy: keys are snapshotted, records are read one at a time

pub mod memory;

use thiserror::Error;

use crate::model::{Item, ItemId};

pub use memory::MemoryStore;

/// Errors raised by a record store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Insert hit an existing key.
    #[error("duplicate key: {0}")]
    DuplicateKey(ItemId),

    /// The store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Lazy, finite sequence of records produced by a scan.
pub type ItemScan = Box<dyn Iterator<Item = Item> + Send>;

/// Keyed persistence for items.
pub trait RecordStore: Send + Sync {
    /// Look up a record by id.
    fn find_by_key(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    /// Insert a new record. Fails with [`StoreError::DuplicateKey`] if the id is taken.
    fn insert(&self, item: Item) -> Result<(), StoreError>;

    /// Rename a record. Returns the number of matched records (0 or 1).
    fn update(&self, id: ItemId, name: &str) -> Result<u64, StoreError>;

    /// Remove a record. Returns the number of deleted records (0 or 1).
    fn delete(&self, id: ItemId) -> Result<u64, StoreError>;

    /// Start a scan over every record.
    fn scan_all(&self) -> Result<ItemScan, StoreError>;
}
