//! Cache Module
//!
//! Provides in-memory caching with byte-budget accounting, TTL expiration,
//! and score-based eviction under memory pressure.

mod entry;
mod evict;
mod sizing;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use sizing::estimated_size;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;
