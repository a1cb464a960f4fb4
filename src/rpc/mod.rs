//! RPC service subsystem.
//!
//! # Data Flow
//! ```text
//! gRPC call (tonic)
//!     → service.rs (decode message, one attempt per call)
//!     → handlers.rs (store work, returns CallOutcome)
//!     → store (RecordStore)
//!     ← service.rs (CallOutcome → Status / response stream)
//! ```
//!
//! # Call Shapes
//! - Unary: CreateItem, UpdateItem, DeleteItem, GetItemById
//! - Server-streaming: ListAllItems
//! - Client-streaming: AddItems
//! - Bidirectional: ChatAboutItems
//!
//! # Design Decisions
//! - No retries here; the gateway is the only retry authority
//! - Streams go through bounded channels (back-pressure)
//! - Bulk-add ids come from one shared atomic counter

pub mod handlers;
pub mod ids;
pub mod proto;
pub mod server;
pub mod service;

pub use handlers::ItemHandlers;
pub use ids::IdAllocator;
pub use server::RpcServer;
pub use service::ItemRpcService;
