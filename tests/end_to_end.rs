//! Gateway → gRPC → store over real sockets.

use reqwest::StatusCode;
use serde_json::{json, Value};

use item_gateway::backend::{GrpcBackend, ItemBackend};
use item_gateway::config::BackendConfig;
use item_gateway::resilience::Deadlines;
use item_gateway::store::MemoryStore;
use item_gateway::AppConfig;

mod common;

#[tokio::test]
async fn test_crud_through_the_whole_stack() {
    let (rpc_addr, rpc_shutdown) = common::start_item_service(MemoryStore::new()).await;
    let (gateway_addr, gateway_shutdown) =
        common::start_gateway(rpc_addr, AppConfig::default()).await;
    let client = reqwest::Client::new();
    let base = format!("http://{gateway_addr}");

    let res = client
        .post(format!("{base}/items"))
        .json(&json!({"id": 5, "name": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(res.headers().contains_key("x-request-id"));

    let res = client.get(format!("{base}/items/5")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"id": 5, "name": "x"}));

    let res = client
        .put(format!("{base}/items/5"))
        .json(&json!({"id": 5, "name": "y"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client.get(format!("{base}/items")).send().await.unwrap();
    assert_eq!(res.json::<Value>().await.unwrap(), json!([{"id": 5, "name": "y"}]));

    let res = client
        .delete(format!("{base}/items/5"))
        .json(&json!({"id": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client.get(format!("{base}/items/5")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    gateway_shutdown.trigger();
    rpc_shutdown.trigger();
}

#[tokio::test]
async fn test_streamed_additions_are_visible_through_the_gateway() {
    let (rpc_addr, rpc_shutdown) = common::start_item_service(MemoryStore::new()).await;
    let (gateway_addr, gateway_shutdown) =
        common::start_gateway(rpc_addr, AppConfig::default()).await;

    let config = BackendConfig {
        host: rpc_addr.ip().to_string(),
        port: rpc_addr.port(),
        ..BackendConfig::default()
    };
    let backend = GrpcBackend::connect_lazy(&config, Deadlines::default()).unwrap();
    let added = backend
        .add_items(vec!["Zoey".into(), "Prapti".into(), "Bavan".into()])
        .await
        .unwrap();
    assert_eq!(added, 3);
    assert_eq!(backend.list_items().await.unwrap().len(), 3);

    let replies = backend.chat(vec!["Hello".into()]).await.unwrap();
    assert_eq!(replies, vec!["Server Echo: Hello"]);

    let items: Value = reqwest::get(format!("http://{gateway_addr}/items"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        items,
        json!([{"id": 1, "name": "Zoey"}, {"id": 2, "name": "Prapti"}, {"id": 3, "name": "Bavan"}])
    );

    gateway_shutdown.trigger();
    rpc_shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_backend_exhausts_retries_then_fails_fast() {
    let dead = common::dead_address().await;
    let (gateway_addr, shutdown) = common::start_gateway(dead, AppConfig::default()).await;
    let client = reqwest::Client::new();
    let url = format!("http://{gateway_addr}/items");

    let res = client
        .post(&url)
        .json(&json!({"id": 1, "name": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["kind"], "retries_exhausted");
    assert!(body["details"].as_str().unwrap().contains("after 3 attempts"));

    let res = client
        .post(&url)
        .json(&json!({"id": 1, "name": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let health: Value = reqwest::get(format!("http://{gateway_addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["circuit_breaker_state"], "open");

    let res = reqwest::get(format!("http://{gateway_addr}/items/1")).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    shutdown.trigger();
}
