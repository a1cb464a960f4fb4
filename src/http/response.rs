//! Response shapes and status mapping.
//!
//! # Responsibilities
//! - Map gateway and backend errors to HTTP status codes
//! - Keep fail-fast and exhausted-retry responses distinguishable
//!
//! # Status Mapping
//! ```text
//! validation / invalid argument   → 400
//! not found                       → 404
//! breaker open                    → 503
//! retries exhausted               → 500
//! duplicate key                   → 500
//! any other backend error         → 500
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::CallError;
use crate::model::Item;
use crate::resilience::GatewayError;

/// Error body: `{"error": ..., "kind": ..., "details": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A facade request that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, error: &str, details: Option<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: error.to_string(),
                kind,
                details,
            },
        }
    }

    pub fn validation(details: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation", "Bad request", Some(details.into()))
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn kind(&self) -> &'static str {
        self.body.kind
    }

    pub fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl From<CallError> for ApiError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::NotFound(msg) => {
                Self::new(StatusCode::NOT_FOUND, "not_found", "Item not found", Some(msg))
            }
            CallError::InvalidArgument(msg) => Self::validation(msg),
            CallError::AlreadyExists(msg) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "duplicate_key",
                "Item already exists",
                Some(msg),
            ),
            other => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "backend_error",
                "Backend failure",
                Some(other.to_string()),
            ),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::BreakerOpen => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "breaker_open",
                "Service unavailable",
                Some("circuit breaker is open".to_string()),
            ),
            GatewayError::RetriesExhausted { attempts, last } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "retries_exhausted",
                "Backend failure",
                Some(format!("after {attempts} attempts: {last}")),
            ),
            GatewayError::Terminal(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Body of a successful create, update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mutated {
    pub message: &'static str,
    pub id: i64,
    pub name: String,
}

impl Mutated {
    pub fn new(message: &'static str, item: Item) -> Self {
        Self {
            message,
            id: item.id,
            name: item.name,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub circuit_breaker_state: &'static str,
    pub consecutive_failures: u32,
}
