//! Outcome of a single backend call.
//!
//! Handlers return a [`CallOutcome`] instead of raising transport errors;
//! the gRPC layer translates the tag into a wire status and back.

use thiserror::Error;
use tonic::{Code, Status};

use crate::store::StoreError;

/// Result of one backend attempt. Exactly one of success or a [`CallError`].
pub type CallOutcome<T> = Result<T, CallError>;

/// Failure classes a backend call can end with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The addressed record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request was rejected before touching the store.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Insert conflicted with an existing key.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Backend could not be reached or refused the call.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Call did not finish before its deadline.
    #[error("deadline exceeded")]
    Timeout,

    /// Backend fault while processing the call.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CallError {
    /// Short machine-readable label, used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CallError::NotFound(_) => "not_found",
            CallError::InvalidArgument(_) => "invalid_argument",
            CallError::AlreadyExists(_) => "already_exists",
            CallError::Unavailable(_) => "unavailable",
            CallError::Timeout => "timeout",
            CallError::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for CallError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(id) => {
                CallError::AlreadyExists(format!("item with id {id} already exists"))
            }
            StoreError::Unavailable(msg) => CallError::Unavailable(msg),
        }
    }
}

impl From<CallError> for Status {
    fn from(err: CallError) -> Self {
        match err {
            CallError::NotFound(msg) => Status::not_found(msg),
            CallError::InvalidArgument(msg) => Status::invalid_argument(msg),
            CallError::AlreadyExists(msg) => Status::already_exists(msg),
            CallError::Unavailable(msg) => Status::unavailable(msg),
            CallError::Timeout => Status::deadline_exceeded("deadline exceeded"),
            CallError::Internal(msg) => Status::internal(msg),
        }
    }
}

impl From<Status> for CallError {
    fn from(status: Status) -> Self {
        let message = status.message().to_string();
        match status.code() {
            Code::NotFound => CallError::NotFound(message),
            Code::InvalidArgument => CallError::InvalidArgument(message),
            Code::AlreadyExists => CallError::AlreadyExists(message),
            Code::Unavailable => CallError::Unavailable(message),
            Code::DeadlineExceeded | Code::Cancelled => CallError::Timeout,
            _ => CallError::Internal(message),
        }
    }
}
