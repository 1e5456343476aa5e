//! Permission error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PermissionError {
    #[error("Storage error: {0}")]
    Storage(#[from] meridian_storage::StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt policy value: {0}")]
    CorruptPolicy(String),
}
