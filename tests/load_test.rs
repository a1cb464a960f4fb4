//! Concurrent load through the facade.

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::json;

use item_gateway::AppConfig;

mod common;
use common::send;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates() {
    let (server, backend) = common::gateway(&AppConfig::default());
    let router = Arc::new(server.router());

    let tasks: Vec<_> = (1..=200)
        .map(|id| {
            let router = router.clone();
            tokio::spawn(async move {
                let body = json!({"id": id, "name": format!("item-{id}")}).to_string();
                send(&router, Method::POST, "/items", body).await.0
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::CREATED);
    }

    assert_eq!(backend.store().len(), 200);
    let (status, _, body) = send(&router, Method::GET, "/items", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_limit_queues_instead_of_failing() {
    let mut config = AppConfig::default();
    config.listener.max_concurrent_requests = 2;
    let (server, _backend) = common::gateway(&config);
    let router = Arc::new(server.router());

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let router = router.clone();
            tokio::spawn(async move { send(&router, Method::GET, "/health", "").await.0 })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_failures_open_breaker_once() {
    let mut config = AppConfig::default();
    config.retries.max_attempts = 1;
    let (server, backend) = common::gateway(&config);
    backend.set_outage(Some(item_gateway::CallError::Unavailable("down".into())));
    let router = Arc::new(server.router());

    let tasks: Vec<_> = (1..=20)
        .map(|id| {
            let router = router.clone();
            tokio::spawn(async move {
                let body = json!({"id": id, "name": "x"}).to_string();
                send(&router, Method::POST, "/items", body).await.0
            })
        })
        .collect();

    let mut open = 0;
    for task in tasks {
        match task.await.unwrap() {
            StatusCode::SERVICE_UNAVAILABLE => open += 1,
            status => assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    let snapshot = server.breaker().snapshot();
    assert_eq!(snapshot.consecutive_failures, 3);
    assert_eq!(open, 20 - backend.calls());
}
