//! Domain error types for replydraft.
//!
//! These errors represent domain-level failures that can occur while
//! reconciling reply drafts. They are more specific than infrastructure
//! errors and can be handled appropriately at the application layer.

use thiserror::Error;

/// Domain errors related to the reply editor.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Unknown reply context type: {0}")]
    UnknownContextType(String),

    #[error("Review reply has no durable identity yet")]
    MissingParentIdentity,

    #[error("Persistence failed: {0}")]
    Store(#[from] StoreError),

    #[error("Editor operation failed: {0}")]
    OperationFailed(#[from] anyhow::Error),
}

/// Failures reported by the remote store.
///
/// The editor never interprets these beyond success/failure; the payload
/// is an opaque reason surfaced to whoever invoked the operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record conflict: {0}")]
    Conflict(String),

    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    #[error("Store operation failed: {0}")]
    OperationFailed(#[from] anyhow::Error),
}
