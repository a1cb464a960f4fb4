//! In-memory record store.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::model::{Item, ItemId};
use crate::store::{ItemScan, RecordStore, StoreError};

/// A thread-safe in-memory store keyed by item id.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<DashMap<ItemId, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `items`. Later duplicates win.
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let store = Self::new();
        for item in items {
            store.records.insert(item.id, item.name);
        }
        store
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn find_by_key(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self
            .records
            .get(&id)
            .map(|entry| Item::new(id, entry.value().clone())))
    }

    fn insert(&self, item: Item) -> Result<(), StoreError> {
        match self.records.entry(item.id) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(item.id)),
            Entry::Vacant(slot) => {
                slot.insert(item.name);
                Ok(())
            }
        }
    }

    fn update(&self, id: ItemId, name: &str) -> Result<u64, StoreError> {
        match self.records.get_mut(&id) {
            Some(mut entry) => {
                *entry.value_mut() = name.to_string();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete(&self, id: ItemId) -> Result<u64, StoreError> {
        Ok(self.records.remove(&id).map_or(0, |_| 1))
    }

    fn scan_all(&self) -> Result<ItemScan, StoreError> {
        let mut keys: Vec<ItemId> = self.records.iter().map(|entry| *entry.key()).collect();
        keys.sort_unstable();

        let records = self.records.clone();
        Ok(Box::new(keys.into_iter().filter_map(move |id| {
            records
                .get(&id)
                .map(|entry| Item::new(id, entry.value().clone()))
        })))
    }
}
