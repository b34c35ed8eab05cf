//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Control-flow signals raised by cache operations.
///
/// Both variants are expected outcomes rather than failures: callers usually
/// match on them instead of bubbling them up.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// `add` found a live entry under the key
    #[error("cache: key already exists")]
    AlreadyExists,

    /// `update` found no live entry under the key
    #[error("cache: key not found")]
    NotFound,
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
