//! Shutdown fan-out for the gateway and item service.
//!
//! Each server loop (`GatewayServer::run`, `RpcServer::run`) holds one
//! receiver. On the signal it stops accepting connections and lets the
//! calls already admitted finish: gateway mutations keep their retry loop
//! and the item service drains open streams before the loop returns.

use tokio::sync::broadcast;

/// Broadcasts a single stop signal to every subscribed server.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        // One slot: the signal is sent once and never repeated.
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver for one server loop. Subscribe before `trigger`, a late
    /// subscriber never sees the signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Tell every subscribed server to drain and stop.
    ///
    /// Returns how many servers were listening; zero when none had
    /// subscribed or all of them already exited.
    pub fn trigger(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }

    /// Servers still waiting on the signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
