//! Facade behaviour: routing, validation and status mapping.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use item_gateway::{AppConfig, CallError, Item};

mod common;
use common::send;

#[tokio::test]
async fn test_round_trip() {
    let (server, backend) = common::gateway(&AppConfig::default());
    let router = server.router();

    let (status, _, body) =
        send(&router, Method::POST, "/items", json!({"id": 5, "name": "x"}).to_string()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"message": "Item created", "id": 5, "name": "x"}));

    let (status, _, body) = send(&router, Method::GET, "/items/5", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 5, "name": "x"}));

    let (status, _, body) =
        send(&router, Method::PUT, "/items/5", json!({"id": 5, "name": "y"}).to_string()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Item updated");

    let (_, _, body) = send(&router, Method::GET, "/items/5", "").await;
    assert_eq!(body, json!({"id": 5, "name": "y"}));

    let (status, _, body) =
        send(&router, Method::DELETE, "/items/5", json!({"id": 5}).to_string()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Item deleted");
    assert_eq!(body["id"], 5);

    let (status, _, body) = send(&router, Method::GET, "/items/5", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
    assert!(backend.store().is_empty());
}

#[tokio::test]
async fn test_list_returns_every_item() {
    let (server, _backend) = common::gateway(&AppConfig::default());
    let router = server.router();

    let (status, _, body) = send(&router, Method::GET, "/items", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    for (id, name) in [(2, "b"), (1, "a"), (3, "c")] {
        send(&router, Method::POST, "/items", json!({"id": id, "name": name}).to_string()).await;
    }

    let (_, _, body) = send(&router, Method::GET, "/items", "").await;
    let items: Vec<Item> = serde_json::from_value(body).unwrap();
    assert_eq!(
        items,
        vec![Item::new(1, "a"), Item::new(2, "b"), Item::new(3, "c")]
    );
}

#[tokio::test]
async fn test_malformed_input_is_rejected_before_the_backend() {
    let (server, backend) = common::gateway(&AppConfig::default());
    let router = server.router();

    let cases = [
        (Method::POST, "/items", "not json".to_string()),
        (Method::POST, "/items", String::new()),
        (Method::POST, "/items", json!({"id": 1}).to_string()),
        (Method::POST, "/items", json!({"name": "x"}).to_string()),
        (Method::POST, "/items", json!({"id": "one", "name": "x"}).to_string()),
        (Method::PUT, "/items/1", json!({"id": 2, "name": "x"}).to_string()),
        (Method::PUT, "/items/1", json!({"name": "x"}).to_string()),
        (Method::PUT, "/items/abc", json!({"id": 1, "name": "x"}).to_string()),
        (Method::DELETE, "/items/1", json!({"id": 2}).to_string()),
        (Method::DELETE, "/items/1", "{".to_string()),
        (Method::GET, "/items/abc", String::new()),
    ];

    for (method, uri, body) in cases {
        let (status, _, json) = send(&router, method.clone(), uri, body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri} {body}");
        assert_eq!(json["kind"], "validation");
        assert_eq!(json["error"], "Bad request");
    }
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_delete_without_body_uses_path_id() {
    let (server, backend) = common::gateway(&AppConfig::default());
    let router = server.router();

    send(&router, Method::POST, "/items", json!({"id": 9, "name": "n"}).to_string()).await;
    let (status, _, _) = send(&router, Method::DELETE, "/items/9", "").await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(backend.store().is_empty());
}

#[tokio::test]
async fn test_terminal_backend_answers_are_not_retried() {
    let (server, backend) = common::gateway(&AppConfig::default());
    let router = server.router();

    let (status, _, body) =
        send(&router, Method::PUT, "/items/7", json!({"id": 7, "name": "x"}).to_string()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
    assert_eq!(backend.calls(), 1);

    let (status, _, body) =
        send(&router, Method::POST, "/items", json!({"id": 1, "name": ""}).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
    assert_eq!(backend.calls(), 2);

    send(&router, Method::POST, "/items", json!({"id": 1, "name": "a"}).to_string()).await;
    let (status, _, body) =
        send(&router, Method::POST, "/items", json!({"id": 1, "name": "b"}).to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "duplicate_key");
    assert_eq!(backend.calls(), 4);

    assert_eq!(server.breaker().snapshot().consecutive_failures, 0);
}

#[tokio::test]
async fn test_read_failures_are_single_attempts() {
    let (server, backend) = common::gateway(&AppConfig::default());
    let router = server.router();

    backend.fail_next(1, CallError::Unavailable("down".into()));
    let (status, _, body) = send(&router, Method::GET, "/items/1", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], "backend_error");

    backend.fail_next(1, CallError::Timeout);
    let (status, _, _) = send(&router, Method::GET, "/items", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(backend.calls(), 2);
    assert_eq!(server.breaker().snapshot().consecutive_failures, 0);
}

#[tokio::test]
async fn test_missing_reads_leave_breaker_untouched() {
    let mut config = AppConfig::default();
    config.retries.max_attempts = 1;
    let (server, backend) = common::gateway(&config);
    let router = server.router();

    backend.fail_next(1, CallError::Unavailable("down".into()));
    let (status, _, _) =
        send(&router, Method::POST, "/items", json!({"id": 1, "name": "a"}).to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(server.breaker().snapshot().consecutive_failures, 1);

    for id in 100..110 {
        let (status, _, _) = send(&router, Method::GET, &format!("/items/{id}"), "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    assert_eq!(server.breaker().snapshot().consecutive_failures, 1);
}

#[tokio::test]
async fn test_health_reports_breaker() {
    let (server, _backend) = common::gateway(&AppConfig::default());
    let router = server.router();

    let (status, _, body) = send(&router, Method::GET, "/health", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "healthy", "circuit_breaker_state": "closed", "consecutive_failures": 0})
    );
}

#[tokio::test]
async fn test_request_ids() {
    let (server, _backend) = common::gateway(&AppConfig::default());
    let router = server.router();

    let (_, headers, _) = send(&router, Method::GET, "/health", "").await;
    let generated = headers.get("x-request-id").unwrap().to_str().unwrap();
    assert!(Uuid::parse_str(generated).is_ok());

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-42")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-me-42");
}

#[tokio::test]
async fn test_unknown_routes_and_methods() {
    let (server, backend) = common::gateway(&AppConfig::default());
    let router = server.router();

    let (status, _, _) = send(&router, Method::GET, "/nope", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&router, Method::PATCH, "/items/1", "").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(backend.calls(), 0);
}
