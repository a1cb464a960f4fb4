//! Facade handlers.
//!
//! Mutations go through the retry orchestrator (and with it the breaker).
//! Reads and lists are a single direct attempt.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::http::request::{ensure_ids_match, parse_delete_body, parse_item_body, parse_path_id};
use crate::http::response::{ApiError, HealthBody, Mutated};
use crate::http::server::AppState;
use crate::model::Item;

type Created = (StatusCode, Json<Mutated>);

pub async fn create_item(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Created, ApiError> {
    let item = parse_item_body(&body)?;
    tracing::info!(id = item.id, name = %item.name, "Create requested");

    let created = state
        .orchestrator
        .execute("create", || {
            let backend = state.backend.clone();
            let item = item.clone();
            async move { backend.create_item(item).await }
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Mutated::new("Item created", created))))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Created, ApiError> {
    let path_id = parse_path_id(&raw_id)?;
    let item = parse_item_body(&body)?;
    ensure_ids_match(path_id, item.id)?;
    tracing::info!(id = item.id, name = %item.name, "Update requested");

    let updated = state
        .orchestrator
        .execute("update", || {
            let backend = state.backend.clone();
            let item = item.clone();
            async move { backend.update_item(item).await }
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Mutated::new("Item updated", updated))))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Created, ApiError> {
    let id = parse_path_id(&raw_id)?;
    if let Some(body_id) = parse_delete_body(&body)? {
        ensure_ids_match(id, body_id)?;
    }
    tracing::info!(id, "Delete requested");

    let deleted = state
        .orchestrator
        .execute("delete", || {
            let backend = state.backend.clone();
            async move { backend.delete_item(id).await }
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Mutated::new("Item deleted", deleted))))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let id = parse_path_id(&raw_id)?;
    let item = state.backend.get_item(id).await.map_err(|e| {
        tracing::debug!(id, error = %e, "Read failed");
        ApiError::from(e)
    })?;
    Ok(Json(item))
}

pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state.backend.list_items().await.map_err(|e| {
        tracing::warn!(error = %e, "List failed");
        ApiError::from(e)
    })?;
    Ok(Json(items))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    let snapshot = state.orchestrator.breaker().snapshot();
    Json(HealthBody {
        status: "healthy",
        circuit_breaker_state: snapshot.state.as_str(),
        consecutive_failures: snapshot.consecutive_failures,
    })
}
