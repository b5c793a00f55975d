//! Memoization Facade Module
//!
//! [`MemoCache`] is the public surface the domain layers call: an owned cache
//! instance with an explicit lifecycle, typed accessors, and the
//! `cached_call` wrapper for memoizing expensive asynchronous producers.

use std::future::Future;
use std::sync::Arc;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{CacheStore, StatsSnapshot};
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::spawn_sweeper_task;

// == Memo Cache ==
/// A memory-bounded TTL cache instance.
///
/// Each instance owns its store and its background sweeper, so independent
/// caches can coexist and tests can build isolated instances. The sweeper is
/// aborted by [`dispose`](MemoCache::dispose) or when the instance is dropped.
///
/// All store mutations run under a single write lock, so they are atomic
/// with respect to each other; the only real suspension point in this module
/// is the producer passed to [`cached_call`](MemoCache::cached_call), which
/// runs outside the lock.
#[derive(Debug)]
pub struct MemoCache {
    store: Arc<RwLock<CacheStore>>,
    config: CacheConfig,
    sweeper: Option<JoinHandle<()>>,
}

impl MemoCache {
    // == Constructors ==
    /// Creates a cache on the system clock.
    ///
    /// Must be called from within a tokio runtime when the configuration
    /// enables the background sweeper (`sweep_interval_secs > 0`).
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache with an explicit time source.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(RwLock::new(CacheStore::with_clock(config.clone(), clock)));
        let sweeper = if config.sweep_interval_secs > 0 {
            Some(spawn_sweeper_task(store.clone(), config.sweep_interval_secs))
        } else {
            None
        };

        Ok(Self {
            store,
            config,
            sweeper,
        })
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Core Operations ==
    /// Retrieves the value for `key`, or `None` when absent or expired.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.store.write().await.get(key)
    }

    /// Retrieves the value for `key`, converted to the caller's type.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Stores a value under `key`; see [`CacheStore::set`] for the null and
    /// oversized-entry refusals.
    pub async fn set(&self, key: &str, value: Value, ttl_ms: Option<u64>) -> bool {
        self.store.write().await.set(key.to_string(), value, ttl_ms)
    }

    /// Serializes and stores a typed value under `key`.
    pub async fn set_value<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_ms: Option<u64>,
    ) -> Result<bool> {
        Ok(self.set(key, serde_json::to_value(value)?, ttl_ms).await)
    }

    /// Checks whether a live entry exists for `key`.
    pub async fn has(&self, key: &str) -> bool {
        self.store.write().await.has(key)
    }

    /// Deletes the entry for `key`, returning whether anything was removed.
    pub async fn remove(&self, key: &str) -> bool {
        self.store.write().await.remove(key)
    }

    /// Empties the cache.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    /// Restarts the TTL window of a live entry; see [`CacheStore::extend_ttl`].
    pub async fn extend_ttl(&self, key: &str, additional_ms: u64) -> bool {
        self.store.write().await.extend_ttl(key, additional_ms)
    }

    /// Runs one sweep pass immediately, returning the number of entries
    /// removed. Useful when the background sweeper is disabled.
    pub async fn sweep_expired(&self) -> usize {
        self.store.write().await.sweep_expired()
    }

    // == Memoization ==
    /// Returns the cached value for `key`, or invokes `producer` and caches
    /// its successful result.
    ///
    /// A producer failure propagates to the caller unchanged and is never
    /// cached, so the next call retries. A null result is likewise not
    /// cached. A cached value that no longer matches the requested type is
    /// treated as a miss.
    ///
    /// Concurrent callers that both miss will both invoke their producers:
    /// this wrapper provides at-least-once producer invocation, not
    /// single-flight de-duplication. Callers needing strict single-flight
    /// behavior must layer their own in-flight map above this cache.
    pub async fn cached_call<T, E, F, Fut>(
        &self,
        key: &str,
        producer: F,
        ttl_ms: Option<u64>,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(hit) = self.get(key).await {
            match serde_json::from_value(hit) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    debug!(key, %err, "cached value did not match requested type, treating as miss")
                }
            }
        }

        // The only real suspension point: the store is not locked while the
        // producer runs.
        let produced = producer().await?;

        match serde_json::to_value(&produced) {
            Ok(value) if value.is_null() => {
                debug!(key, "producer returned null, not cached");
            }
            Ok(value) => {
                self.set(key, value, ttl_ms).await;
            }
            Err(err) => {
                warn!(key, %err, "produced value is not serializable, not cached");
            }
        }

        Ok(produced)
    }

    // == Introspection ==
    /// Builds a point-in-time occupancy and performance report.
    pub async fn stats(&self) -> StatsSnapshot {
        self.store.read().await.snapshot()
    }

    /// Returns all live keys matching the pattern, sorted.
    pub async fn keys_matching(&self, pattern: &Regex) -> Vec<String> {
        self.store.read().await.keys_matching(pattern)
    }

    // == Lifecycle ==
    /// Tears the cache down, aborting the background sweeper.
    pub fn dispose(mut self) {
        self.abort_sweeper();
    }

    fn abort_sweeper(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
        }
    }
}

impl Drop for MemoCache {
    fn drop(&mut self) {
        self.abort_sweeper();
    }
}
