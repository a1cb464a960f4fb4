//! Wire messages and generated service plumbing for `items.ItemService`.
//!
//! Messages use the standard protobuf wire format through prost derives;
//! the server trait and client are generated by `build.rs`.

use crate::model::Item;

#[derive(Clone, PartialEq, prost::Message)]
pub struct ItemRequest {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ItemResponse {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(bool, tag = "3")]
    pub success: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ItemsAddedResult {
    #[prost(uint64, tag = "1")]
    pub total_count: u64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ChatMessage {
    #[prost(string, tag = "1")]
    pub content: String,
}

include!(concat!(env!("OUT_DIR"), "/items.ItemService.rs"));

pub use item_service_client::ItemServiceClient;
pub use item_service_server::{ItemService, ItemServiceServer};

impl From<Item> for ItemRequest {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
        }
    }
}

impl From<ItemRequest> for Item {
    fn from(req: ItemRequest) -> Self {
        Item::new(req.id, req.name)
    }
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            success: true,
        }
    }
}

impl From<ItemResponse> for Item {
    fn from(resp: ItemResponse) -> Self {
        Item::new(resp.id, resp.name)
    }
}
