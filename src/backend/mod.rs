//! Backend client subsystem.
//!
//! # Data Flow
//! ```text
//! Facade handler / retry attempt
//!     → ItemBackend (one call, one CallOutcome)
//!     → grpc.rs (tonic client, per-call deadline)
//!     → items.ItemService over HTTP/2
//! ```
//!
//! # Design Decisions
//! - The facade only sees the trait; tests substitute a scripted backend
//! - A single lazily-connected channel is shared by every request
//! - Every call carries a deadline; expiry surfaces as `CallError::Timeout`

pub mod grpc;

use crate::error::CallOutcome;
use crate::model::{Item, ItemId};

pub use grpc::GrpcBackend;

/// The gateway's view of the item service. Each method is one attempt.
#[tonic::async_trait]
pub trait ItemBackend: Send + Sync {
    async fn create_item(&self, item: Item) -> CallOutcome<Item>;

    async fn update_item(&self, item: Item) -> CallOutcome<Item>;

    /// Delete by id. The service echoes the request back.
    async fn delete_item(&self, id: ItemId) -> CallOutcome<Item>;

    async fn get_item(&self, id: ItemId) -> CallOutcome<Item>;

    /// Drain the server stream into a list.
    async fn list_items(&self) -> CallOutcome<Vec<Item>>;
}
