//! Error types for feedsync.

use thiserror::Error;

/// Common error type for feedsync.
#[derive(Error, Debug)]
pub enum FeedSyncError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A feed source could not be fetched or parsed.
    #[error("source unreachable: {url}: {reason}")]
    SourceUnreachable {
        /// The feed URL that failed.
        url: String,
        /// Why it failed.
        reason: String,
    },

    /// A find, delete or insert against the document store failed.
    #[error("store operation failed: {0}")]
    StoreOperation(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FeedSyncError {
    /// Build a `SourceUnreachable` error for a URL.
    pub fn unreachable(url: impl Into<String>, reason: impl Into<String>) -> Self {
        FeedSyncError::SourceUnreachable {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl From<sqlx::Error> for FeedSyncError {
    fn from(e: sqlx::Error) -> Self {
        FeedSyncError::Database(e.to_string())
    }
}

/// Result type alias for feedsync operations.
pub type Result<T> = std::result::Result<T, FeedSyncError>;
