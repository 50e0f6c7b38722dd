//! Errors raised by record store operations.

use thiserror::Error;

use crate::record::RecordId;

/// Errors from the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("record not found: {0}")]
    NotFound(RecordId),
}
