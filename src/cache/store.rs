//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with byte-budget accounting,
//! TTL expiration, and score-based purging under memory pressure.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::evict;
use crate::cache::sizing::estimated_size;
use crate::cache::{CacheEntry, CacheStats, StatsSnapshot};
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;

// == Cache Store ==
/// Main cache storage with TTL expiration and memory-pressure eviction.
///
/// `occupied_bytes` is the authoritative running total of the estimated
/// footprint of every resident entry; every insert, overwrite, expiry, and
/// eviction keeps it exactly in sync.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Running total of estimated bytes held by resident entries
    occupied_bytes: u64,
    /// Performance counters
    stats: CacheStats,
    /// Capacity and policy configuration
    config: CacheConfig,
    /// Time source for TTL and access-stat timestamps
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructors ==
    /// Creates a new CacheStore on the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore with an explicit time source.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            occupied_bytes: 0,
            stats: CacheStats::new(),
            config,
            clock,
        }
    }

    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if present and not expired; a hit bumps the entry's
    /// access count and last-accessed timestamp. An expired entry is removed
    /// on the spot (lazy expiry) and reads as absent, never as a stale value.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = self.now_ms();

        let expired = match self.entries.get(key).map(|e| e.is_expired(now)) {
            Some(expired) => expired,
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.discard_expired(key);
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.touch(now);
        let value = entry.value.clone();
        self.stats.record_hit();
        Some(value)
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL (milliseconds).
    ///
    /// Returns `true` when the value was stored. Two refusals return `false`
    /// without touching the rest of the store:
    /// - a null value deletes any existing entry for `key` instead of being
    ///   stored ("set to nothing clears it");
    /// - a value whose estimated footprint exceeds the single-entry ceiling
    ///   is not cached, so one value can never dominate the whole budget.
    ///
    /// An overwrite subtracts the old entry's size before the new size is
    /// added. When the insert would push `occupied_bytes` past the capacity
    /// ceiling, the purger frees headroom before this call returns.
    pub fn set(&mut self, key: String, value: Value, ttl_ms: Option<u64>) -> bool {
        if value.is_null() {
            if self.remove(&key) {
                debug!(%key, "null value cleared existing entry");
            }
            return false;
        }

        let size = estimated_size(&value, self.config.fallback_entry_size);
        if size > self.config.max_entry_bytes() {
            debug!(
                %key,
                size,
                limit = self.config.max_entry_bytes(),
                "refusing oversized entry"
            );
            return false;
        }

        // Take the previous entry out first so the overwrite never
        // double-counts and the purger never scores the key being replaced.
        if let Some(previous) = self.entries.remove(&key) {
            self.occupied_bytes = self
                .occupied_bytes
                .saturating_sub(previous.estimated_size_bytes);
        }

        if self.occupied_bytes + size > self.config.max_size_bytes {
            let overshoot =
                (self.occupied_bytes + size).saturating_sub(self.config.threshold_bytes());
            let target = (overshoot as f64 * self.config.purge_headroom).ceil() as u64;
            self.purge(target);
        }

        let now = self.now_ms();
        let ttl = ttl_ms.unwrap_or(self.config.default_ttl_ms);
        self.entries.insert(key, CacheEntry::new(value, ttl, size, now));
        self.occupied_bytes += size;
        true
    }

    // == Has ==
    /// Checks whether a live entry exists for `key`.
    ///
    /// Same lazy-expiry side effect as `get`, but no access statistics are
    /// updated and no hit/miss is recorded.
    pub fn has(&mut self, key: &str) -> bool {
        let now = self.now_ms();
        match self.entries.get(key).map(|e| e.is_expired(now)) {
            Some(true) => {
                self.discard_expired(key);
                false
            }
            Some(false) => true,
            None => false,
        }
    }

    // == Remove ==
    /// Deletes an entry by key, returning whether anything was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        if let Some(entry) = self.entries.remove(key) {
            self.occupied_bytes = self
                .occupied_bytes
                .saturating_sub(entry.estimated_size_bytes);
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Empties the store and resets the byte accounting.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.occupied_bytes = 0;
    }

    // == Extend TTL ==
    /// Restarts the TTL window of a live entry at now, returning `false` for
    /// an absent or already-expired key.
    ///
    /// This is a window reset, not an additive extension: the entry gets its
    /// full `ttl_ms` of life again and `additional_ms` does not enter the
    /// deadline arithmetic. Repeated short extensions therefore behave like
    /// full TTL resets.
    pub fn extend_ttl(&mut self, key: &str, additional_ms: u64) -> bool {
        if additional_ms == 0 {
            return false;
        }

        let now = self.now_ms();
        let expired = match self.entries.get(key).map(|e| e.is_expired(now)) {
            Some(expired) => expired,
            None => return false,
        };
        if expired {
            self.discard_expired(key);
            return false;
        }

        if let Some(entry) = self.entries.get_mut(key) {
            entry.restart_window(now);
            debug!(
                %key,
                additional_ms,
                new_deadline_ms = entry.deadline_ms(),
                "TTL window restarted"
            );
            true
        } else {
            false
        }
    }

    // == Sweep Expired ==
    /// Removes all expired entries and reclaims their accounted size.
    ///
    /// Returns the number of entries removed, for observability.
    pub fn sweep_expired(&mut self) -> usize {
        let now = self.now_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();
        let mut reclaimed = 0u64;
        for key in expired_keys {
            if let Some(entry) = self.entries.remove(&key) {
                reclaimed += entry.estimated_size_bytes;
            }
        }

        self.occupied_bytes = self.occupied_bytes.saturating_sub(reclaimed);
        self.stats.record_expirations(count as u64);
        count
    }

    // == Purge ==
    /// Evicts the lowest-value entries until at least `target_bytes` are
    /// freed or the store is empty. Returns the bytes actually freed.
    ///
    /// Freeing less than the target is not a failure; the caller's insert
    /// proceeds regardless.
    pub(crate) fn purge(&mut self, target_bytes: u64) -> u64 {
        if target_bytes == 0 || self.entries.is_empty() {
            return 0;
        }

        let now = self.now_ms();
        let victims = evict::select_victims(&self.entries, now, target_bytes);
        let evicted = victims.len() as u64;

        let mut freed = 0u64;
        for key in victims {
            if let Some(entry) = self.entries.remove(&key) {
                freed += entry.estimated_size_bytes;
            }
        }

        self.occupied_bytes = self.occupied_bytes.saturating_sub(freed);
        self.stats.record_evictions(evicted);
        info!(freed_bytes = freed, evicted, target_bytes, "purged low-value entries");
        freed
    }

    // == Keys Matching ==
    /// Returns all live keys matching the pattern, sorted.
    ///
    /// The pattern is compiled by the caller, so an invalid pattern is
    /// unrepresentable here.
    pub fn keys_matching(&self, pattern: &Regex) -> Vec<String> {
        let now = self.now_ms();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired(now) && pattern.is_match(key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    // == Snapshot ==
    /// Builds a point-in-time occupancy report.
    ///
    /// Per-entry figures (counts, prefixes, oldest age, mean accesses) cover
    /// live entries only; `current_size_bytes` reports the authoritative
    /// accounting counter, which may still include expired entries the
    /// sweeper has not visited yet.
    pub fn snapshot(&self) -> StatsSnapshot {
        let now = self.now_ms();

        let mut total_items = 0usize;
        let mut keys_by_prefix: BTreeMap<String, usize> = BTreeMap::new();
        let mut access_total = 0u64;
        let mut oldest_inserted: Option<u64> = None;

        for (key, entry) in &self.entries {
            if entry.is_expired(now) {
                continue;
            }
            total_items += 1;
            // Keys without a `:` group under the whole key.
            let prefix = key.split(':').next().unwrap_or_default().to_string();
            *keys_by_prefix.entry(prefix).or_insert(0) += 1;
            access_total += entry.access_count;
            oldest_inserted = Some(match oldest_inserted {
                Some(oldest) => oldest.min(entry.inserted_at),
                None => entry.inserted_at,
            });
        }

        let usage_percentage = if self.config.max_size_bytes == 0 {
            0.0
        } else {
            self.occupied_bytes as f64 / self.config.max_size_bytes as f64 * 100.0
        };
        let average_access_count = if total_items == 0 {
            0.0
        } else {
            access_total as f64 / total_items as f64
        };

        StatsSnapshot {
            total_items,
            current_size_bytes: self.occupied_bytes,
            max_size_bytes: self.config.max_size_bytes,
            usage_percentage,
            oldest_item_age_ms: oldest_inserted.map(|inserted| now.saturating_sub(inserted)),
            keys_by_prefix,
            average_access_count,
            counters: self.stats.clone(),
            hit_rate: self.stats.hit_rate(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    // == Accessors ==
    /// Current accounted footprint in bytes.
    pub fn occupied_bytes(&self) -> u64 {
        self.occupied_bytes
    }

    /// Returns the current number of resident entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Running performance counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    // == Expired Entry Removal ==
    /// Removes an entry found expired on access and reclaims its size.
    fn discard_expired(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            self.occupied_bytes = self
                .occupied_bytes
                .saturating_sub(entry.estimated_size_bytes);
            self.stats.record_expirations(1);
        }
    }

    /// Sum of resident entry sizes, for accounting assertions in tests.
    #[cfg(test)]
    pub(crate) fn resident_size_sum(&self) -> u64 {
        self.entries
            .values()
            .map(|entry| entry.estimated_size_bytes)
            .sum()
    }
}
