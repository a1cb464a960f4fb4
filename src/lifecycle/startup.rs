//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the bounded worker pool each server runs on
//! - Bind listeners before traffic is accepted
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Worker count comes from config, not from the CPU count

use std::io;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

/// Multi-threaded runtime with exactly `worker_threads` workers.
pub fn build_runtime(worker_threads: usize, thread_name: &str) -> io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads.max(1))
        .thread_name(thread_name)
        .enable_all()
        .build()
}

/// Bind a listener, logging the resolved address.
pub async fn bind(address: &str, what: &'static str) -> io::Result<TcpListener> {
    let listener = TcpListener::bind(address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, listener = what, "Listening for connections");
    Ok(listener)
}
