//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router from an explicit route table
//! - Wire up middleware (request id, tracing, timeout, concurrency limit)
//! - Own the breaker and retry orchestrator shared by all requests
//! - Bind server to listener and drain on shutdown

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::backend::ItemBackend;
use crate::config::AppConfig;
use crate::http::handlers;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::observability::metrics;
use crate::resilience::{CircuitBreaker, RetryOrchestrator};

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ItemBackend>,
    pub orchestrator: RetryOrchestrator,
}

/// HTTP server for the gateway facade.
pub struct GatewayServer {
    router: Router,
    orchestrator: RetryOrchestrator,
}

impl GatewayServer {
    /// Create a server whose mutations reach `backend` through one breaker.
    pub fn new(backend: Arc<dyn ItemBackend>, config: &AppConfig) -> Self {
        let breaker = Arc::new(CircuitBreaker::from_config(
            config.backend.endpoint(),
            &config.breaker,
        ));
        let orchestrator = RetryOrchestrator::from_config(breaker, &config.retries);
        let state = AppState {
            backend,
            orchestrator: orchestrator.clone(),
        };

        Self {
            router: build_router(state, config),
            orchestrator,
        }
    }

    /// The fully layered router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        self.orchestrator.breaker()
    }

    /// Run the server until the shutdown signal, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/items", post(handlers::create_item).get(handlers::list_items))
        .route(
            "/items/{id}",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/health", get(handlers::health))
        .route_layer(middleware::from_fn(note_route))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
                .layer(middleware::from_fn(track_requests))
                .layer(GlobalConcurrencyLimitLayer::new(
                    config.listener.max_concurrent_requests,
                ))
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.timeouts.request_secs,
                ))),
        )
}

/// Route template of the request, filled in once routing has matched.
///
/// Shared with the outer metrics layer so requests cut short by the timeout
/// or body limit keep their route label.
#[derive(Clone, Default)]
struct RouteSlot(Arc<OnceLock<String>>);

/// Request metrics, recorded outside the timeout and body limit.
async fn track_requests(mut request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let slot = RouteSlot::default();
    request.extensions_mut().insert(slot.clone());

    let response = next.run(request).await;
    let route = slot.0.get().map(String::as_str).unwrap_or("unmatched");
    metrics::record_request(&method, route, response.status().as_u16(), start);
    response
}

async fn note_route(request: Request, next: Next) -> Response {
    let extensions = request.extensions();
    if let (Some(slot), Some(path)) = (extensions.get::<RouteSlot>(), extensions.get::<MatchedPath>()) {
        let _ = slot.0.set(path.as_str().to_owned());
    }
    next.run(request).await
}
