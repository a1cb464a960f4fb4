//! Item record type shared by the store, the RPC service and the facade.

use serde::{Deserialize, Serialize};

/// Identifier of an item. Unique within the record store.
pub type ItemId = i64;

/// A stored item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
