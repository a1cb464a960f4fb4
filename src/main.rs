//! Item Gateway
//!
//! HTTP facade in front of the item service.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                  GATEWAY                      │
//!                    │                                               │
//!   Client Request   │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│ handlers │──▶│ resilience │  │
//!                    │  │ server │   │          │   │ retry + cb │  │
//!                    │  └────────┘   └────┬─────┘   └─────┬──────┘  │
//!                    │                    │ reads         │ writes  │
//!                    │                    ▼               ▼         │
//!   Client Response  │               ┌──────────────────────────┐   │
//!   ◀────────────────┼───────────────│   backend (gRPC client)  │◀──┼──── item-service
//!                    │               └──────────────────────────┘   │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use item_gateway::backend::GrpcBackend;
use item_gateway::config::{load_config, CONFIG_PATH_ENV};
use item_gateway::lifecycle::{signals, startup, Shutdown};
use item_gateway::observability::{logging, metrics};
use item_gateway::resilience::Deadlines;
use item_gateway::{AppConfig, GatewayServer};

#[derive(Parser)]
#[command(name = "item-gateway")]
#[command(about = "HTTP gateway with retries and a circuit breaker in front of the item service")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    logging::init(&config.observability.log_level);

    let runtime = startup::build_runtime(config.listener.worker_threads, "gateway-worker")?;
    runtime.block_on(serve(config))
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.endpoint(),
        failure_threshold = config.breaker.failure_threshold,
        reset_timeout_secs = config.breaker.reset_timeout_secs,
        max_attempts = config.retries.max_attempts,
        "item-gateway v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let backend = GrpcBackend::connect_lazy(&config.backend, Deadlines::from(&config.timeouts))?;
    let server = GatewayServer::new(Arc::new(backend), &config);

    let listener = startup::bind(&config.listener.bind_address, "http").await?;
    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
