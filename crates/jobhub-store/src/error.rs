//! Store error types.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate key in {collection}: {key}")]
    DuplicateKey {
        collection: &'static str,
        key: String,
    },

    #[error("Duplicate {index} in {collection}: {value}")]
    DuplicateIndex {
        collection: &'static str,
        index: &'static str,
        value: String,
    },

    #[error("Document not found in {collection}: {key}")]
    NotFound {
        collection: &'static str,
        key: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the error is a uniqueness violation rather than a fault.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            StoreError::DuplicateKey { .. } | StoreError::DuplicateIndex { .. }
        )
    }
}
