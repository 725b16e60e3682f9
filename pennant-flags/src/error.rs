//! Error types for flag evaluation.

use pennant_cache::CacheError;
use thiserror::Error;

/// Result type for flag evaluation.
pub type FlagResult<T> = Result<T, FlagError>;

/// Result type for definition store lookups.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a [`DefinitionStore`](crate::DefinitionStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("Definition store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with something unusable
    #[error("Definition store error: {0}")]
    Backend(String),
}

/// Errors surfaced to callers of the evaluation entry points.
///
/// A missing definition is never an error; it resolves to the configured
/// default.
#[derive(Debug, Error)]
pub enum FlagError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A percentage outside `[0, 100]`
    #[error("Invalid percent: {0}")]
    InvalidPercent(String),
}
