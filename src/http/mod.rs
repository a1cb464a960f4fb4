//! HTTP facade subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, timeout, concurrency limit)
//!     → handlers.rs (one handler per route-table entry)
//!     → request.rs (parse body and path, validate ids)
//!     → resilience (mutations only) → backend
//!     → response.rs (status mapping, error body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{build_router, AppState, GatewayServer};
