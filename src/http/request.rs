//! Request handling and validation.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Parse item bodies from raw bytes
//! - Check path ids against body ids
//!
//! # Design Decisions
//! - Bodies are read as bytes so that every malformed input is a 400
//!   with the same error shape, never an extractor rejection
//! - Validation runs before any backend call

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, Request};
use serde::Deserialize;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::ApiError;
use crate::model::{Item, ItemId};

/// Header carrying the request correlation id.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Assigns a fresh UUID v4 to requests that arrive without an id.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

#[derive(Debug, Deserialize)]
struct ItemPayload {
    id: ItemId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct DeletePayload {
    id: Option<ItemId>,
}

/// Parse a create/update body. Both `id` and `name` must be present.
pub fn parse_item_body(body: &Bytes) -> Result<Item, ApiError> {
    let payload: ItemPayload = serde_json::from_slice(body)
        .map_err(|e| ApiError::validation(format!("expected {{\"id\": int, \"name\": string}}: {e}")))?;
    Ok(Item::new(payload.id, payload.name))
}

/// Parse an optional delete body, returning the id it names, if any.
pub fn parse_delete_body(body: &Bytes) -> Result<Option<ItemId>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let payload: DeletePayload = serde_json::from_slice(body)
        .map_err(|e| ApiError::validation(format!("expected {{\"id\": int}}: {e}")))?;
    Ok(payload.id)
}

/// Parse the `{id}` path segment.
pub fn parse_path_id(raw: &str) -> Result<ItemId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("item id must be an integer, got {raw:?}")))
}

pub fn ensure_ids_match(path_id: ItemId, body_id: ItemId) -> Result<(), ApiError> {
    if path_id != body_id {
        return Err(ApiError::validation(format!(
            "path id {path_id} does not match body id {body_id}"
        )));
    }
    Ok(())
}
