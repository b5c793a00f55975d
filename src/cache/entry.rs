//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support and
//! the per-entry access statistics the eviction scorer consumes.

use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with value, footprint, and access metadata.
///
/// Timestamps are Unix milliseconds supplied by the store's clock; the entry
/// itself never reads the wall clock.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Insertion timestamp; reset on overwrite and on TTL extension,
    /// never on plain reads
    pub inserted_at: u64,
    /// Entry-specific time-to-live in milliseconds
    pub ttl_ms: u64,
    /// Approximate footprint, computed once at insertion
    pub estimated_size_bytes: u64,
    /// Number of successful reads, starting at 1 on insert
    pub access_count: u64,
    /// Timestamp of the most recent successful read
    pub last_accessed_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry inserted at `now_ms`.
    pub fn new(value: Value, ttl_ms: u64, estimated_size_bytes: u64, now_ms: u64) -> Self {
        Self {
            value,
            inserted_at: now_ms,
            ttl_ms,
            estimated_size_bytes,
            access_count: 1,
            last_accessed_at: now_ms,
        }
    }

    // == Deadline ==
    /// Absolute expiration timestamp in Unix milliseconds.
    pub fn deadline_ms(&self) -> u64 {
        self.inserted_at.saturating_add(self.ttl_ms)
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// Boundary condition: an entry is expired once the current time reaches
    /// the deadline (`now >= inserted_at + ttl_ms`), so an entry whose TTL
    /// has fully elapsed is never served again.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.deadline_ms()
    }

    // == Remaining TTL ==
    /// Returns remaining life in milliseconds, 0 once expired.
    pub fn remaining_ttl_ms(&self, now_ms: u64) -> u64 {
        self.deadline_ms().saturating_sub(now_ms)
    }

    // == Touch ==
    /// Records a successful read: bumps the access count and the
    /// last-accessed timestamp. The TTL window is untouched.
    pub fn touch(&mut self, now_ms: u64) {
        self.access_count += 1;
        self.last_accessed_at = now_ms;
    }

    // == Restart Window ==
    /// Restarts the TTL window at `now_ms`, giving the entry its full
    /// `ttl_ms` of life again.
    pub fn restart_window(&mut self, now_ms: u64) {
        self.inserted_at = now_ms;
    }
}
