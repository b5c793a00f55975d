//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! The cache's own bookkeeping (size estimation, eviction, sweeping) never
//! fails a caller's request; the variants here cover configuration rejection
//! and serde conversion at the typed accessor boundary. Producer failures in
//! `cached_call` propagate as the caller's own error type, untouched.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configuration rejected by [`CacheConfig::validate`](crate::CacheConfig::validate)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A typed accessor could not convert between the stored JSON value and
    /// the caller's type
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
