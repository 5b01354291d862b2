//! Error types for store operations.

use std::time::Duration;

use quilt_core::{ObjectId, ResourceKind, ResourcePath};

/// Errors surfaced by the object-store capability surface.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("path not found: {0}")]
    PathNotFound(ResourcePath),
    #[error("type mismatch at {path}: expected {expected:?}")]
    TypeMismatch {
        path: ResourcePath,
        expected: ResourceKind,
    },
    #[error("object {0} is not defined")]
    ObjectNotDefined(ObjectId),
    #[error("unknown client: {0}")]
    UnknownClient(String),
    #[error("change subscription closed")]
    SubscriptionClosed,
}
