//! Pipeline error type.

use record_store::StoreError;
use thiserror::Error;

/// Errors raised inside the annotation pipeline.
///
/// These never cross the hook boundary: [`crate::Session`] turns them into a
/// log entry and returns the hook input unchanged.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid policy: {0}")]
    Policy(#[from] toml::de::Error),

    #[error("session state error: {0}")]
    State(#[from] serde_json::Error),

    #[error("no free number left for records named {0}")]
    NumbersExhausted(String),
}
