//! Item Service
//!
//! gRPC server for `items.ItemService` over the in-memory record store.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use item_gateway::config::{load_config, CONFIG_PATH_ENV};
use item_gateway::lifecycle::{signals, startup, Shutdown};
use item_gateway::observability::{logging, metrics};
use item_gateway::store::MemoryStore;
use item_gateway::{AppConfig, RpcServer};

#[derive(Parser)]
#[command(name = "item-service")]
#[command(about = "Streaming gRPC item service")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    logging::init(&config.observability.log_level);

    let runtime = startup::build_runtime(config.rpc.worker_threads, "rpc-worker")?;
    runtime.block_on(serve(config))
}

async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.rpc.bind_address,
        worker_threads = config.rpc.worker_threads,
        stream_buffer = config.rpc.stream_buffer,
        "item-service v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let store = Arc::new(MemoryStore::new());
    let server = RpcServer::new(store, config.rpc.clone());

    let listener = startup::bind(&config.rpc.bind_address, "grpc").await?;
    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
