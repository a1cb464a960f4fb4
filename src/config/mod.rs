//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides: GRPC_HOST, GRPC_PORT, ...)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → sections handed to each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError, CONFIG_PATH_ENV};
pub use schema::{
    AppConfig, BackendConfig, BreakerConfig, ListenerConfig, ObservabilityConfig, RetryConfig,
    RpcConfig, TimeoutConfig,
};
pub use validation::ValidationError;
