//! Resilient item gateway and streaming item service.

// Domain
pub mod error;
pub mod model;
pub mod store;

// Servers and clients
pub mod backend;
pub mod http;
pub mod rpc;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::AppConfig;
pub use error::{CallError, CallOutcome};
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use model::{Item, ItemId};
pub use rpc::RpcServer;
