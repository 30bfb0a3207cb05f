//! Repository Module
//!
//! SQL access for the sync schema. Methods take a `&mut SqliteConnection`
//! so that callers decide the transaction boundary: handlers pass a pool
//! connection, the mutation engine passes its open transaction.

pub mod order;
pub mod order_link;
pub mod product;

// Re-exports
pub use order::OrderRepository;
pub use order_link::OrderLinkRepository;
pub use product::ProductRepository;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Validation(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// True when the error is a unique-constraint violation.
///
/// Check-then-insert races are resolved here: the constraint, not the
/// preceding existence check, is the actual uniqueness guarantee.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}
