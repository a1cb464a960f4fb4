//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_stream::StreamExt;
use tonic::transport::Channel;
use tower::ServiceExt;

use item_gateway::backend::{GrpcBackend, ItemBackend};
use item_gateway::config::{AppConfig, RpcConfig};
use item_gateway::lifecycle::Shutdown;
use item_gateway::resilience::Deadlines;
use item_gateway::rpc::proto::ItemServiceClient;
use item_gateway::rpc::{IdAllocator, ItemHandlers};
use item_gateway::store::MemoryStore;
use item_gateway::{CallError, CallOutcome, GatewayServer, Item, ItemId, RpcServer};

/// In-process backend with real item semantics and injectable failures.
///
/// Queued failures are consumed one per call; an outage fails every call
/// once the queue is empty. Hung calls never complete.
pub struct ScriptedBackend {
    handlers: ItemHandlers,
    store: MemoryStore,
    failures: Mutex<VecDeque<CallError>>,
    outage: Mutex<Option<CallError>>,
    calls: AtomicUsize,
    hangs: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        let store = MemoryStore::new();
        let handlers = ItemHandlers::new(Arc::new(store.clone()), Arc::new(IdAllocator::new(1)), 16);
        Arc::new(Self {
            handlers,
            store,
            failures: Mutex::new(VecDeque::new()),
            outage: Mutex::new(None),
            calls: AtomicUsize::new(0),
            hangs: AtomicUsize::new(0),
        })
    }

    pub fn fail_next(&self, count: usize, err: CallError) {
        let mut failures = self.failures.lock().unwrap();
        failures.extend(std::iter::repeat(err).take(count));
    }

    /// The next `count` calls never answer.
    pub fn hang_next(&self, count: usize) {
        self.hangs.store(count, Ordering::SeqCst);
    }

    pub fn set_outage(&self, err: Option<CallError>) {
        *self.outage.lock().unwrap() = err;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    async fn scripted(&self) -> CallOutcome<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hang = self
            .hangs
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if hang {
            std::future::pending::<()>().await;
        }
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        match self.outage.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[tonic::async_trait]
impl ItemBackend for ScriptedBackend {
    async fn create_item(&self, item: Item) -> CallOutcome<Item> {
        self.scripted().await?;
        self.handlers.create(item)
    }

    async fn update_item(&self, item: Item) -> CallOutcome<Item> {
        self.scripted().await?;
        self.handlers.update(item)
    }

    async fn delete_item(&self, id: ItemId) -> CallOutcome<Item> {
        self.scripted().await?;
        self.handlers.delete(Item::new(id, ""))
    }

    async fn get_item(&self, id: ItemId) -> CallOutcome<Item> {
        self.scripted().await?;
        self.handlers.get(id)
    }

    async fn list_items(&self) -> CallOutcome<Vec<Item>> {
        self.scripted().await?;
        self.handlers.list().collect::<Vec<_>>().await.into_iter().collect()
    }
}

/// Gateway router over a scripted backend.
pub fn gateway(config: &AppConfig) -> (GatewayServer, Arc<ScriptedBackend>) {
    let backend = ScriptedBackend::new();
    let server = GatewayServer::new(backend.clone(), config);
    (server, backend)
}

/// Drive one request through the router.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: impl Into<Body>,
) -> (StatusCode, HeaderMap, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

/// Start the item service on an ephemeral port.
pub async fn start_item_service(store: MemoryStore) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = RpcServer::new(Arc::new(store), RpcConfig::default());
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

pub async fn rpc_client(addr: SocketAddr) -> ItemServiceClient<Channel> {
    ItemServiceClient::connect(format!("http://{addr}"))
        .await
        .unwrap()
}

/// Start the gateway on an ephemeral port, talking gRPC to `backend_addr`.
pub async fn start_gateway(backend_addr: SocketAddr, mut config: AppConfig) -> (SocketAddr, Shutdown) {
    config.backend.host = backend_addr.ip().to_string();
    config.backend.port = backend_addr.port();

    let backend =
        GrpcBackend::connect_lazy(&config.backend, Deadlines::from(&config.timeouts)).unwrap();
    let server = GatewayServer::new(Arc::new(backend), &config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// An address nothing is listening on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
