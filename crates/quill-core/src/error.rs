//! Domain-level and store-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Content errors - deterministic business outcomes surfaced to callers.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Requester is not the author of this resource")]
    Forbidden,

    #[error("Slug already exists: {0}")]
    DuplicateSlug(String),

    #[error("Referenced category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("Page numbers are 1-based, got {0}")]
    InvalidPage(u64),

    #[error("Page size must be between 1 and 100, got {0}")]
    InvalidPageSize(u64),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Post reached the embedded comment limit")]
    CommentLimitReached,

    #[error("Storage operation timed out")]
    Timeout,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ContentError {
    /// Only transient infrastructure failures are eligible for retry.
    /// Business outcomes (not-found, forbidden, validation) never are.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ContentError::Timeout | ContentError::StorageUnavailable(_)
        )
    }
}

/// Store-level errors - returned by port implementations.
///
/// Known conditions map onto the content taxonomy; anything unexpected is
/// wrapped as `StorageUnavailable` rather than leaked raw.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated on index '{index}'")]
    DuplicateKey { index: String },

    #[error("Document not found")]
    NotFound,

    #[error("Operation exceeded the storage deadline")]
    Timeout,

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<StoreError> for ContentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => ContentError::Timeout,
            StoreError::DuplicateKey { index } => {
                // Slug collisions are the only unique index callers can race
                // on by constructing titles; everything else is a data error.
                ContentError::StorageUnavailable(format!("unexpected duplicate key on '{index}'"))
            }
            other => ContentError::StorageUnavailable(other.to_string()),
        }
    }
}
