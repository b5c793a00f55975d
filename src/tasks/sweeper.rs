//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries so memory
//! is reclaimed even for keys nobody reads again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between passes. Each pass acquires a write lock on the store and removes
/// every entry whose TTL has elapsed, decrementing the byte accounting.
///
/// # Arguments
/// * `store` - Shared reference to the cache store
/// * `sweep_interval_secs` - Interval in seconds between passes
///
/// # Returns
/// A JoinHandle for the spawned task; abort it to tear the sweeper down so
/// the process can exit cleanly.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::new(CacheConfig::default())));
/// let sweeper_handle = spawn_sweeper_task(store.clone(), 60);
/// // Later, during shutdown:
/// sweeper_handle.abort();
/// ```
pub fn spawn_sweeper_task(
    store: Arc<RwLock<CacheStore>>,
    sweep_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweeper with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            // Acquire write lock and sweep expired entries
            let removed = {
                let mut store_guard = store.write().await;
                store_guard.sweep_expired()
            };

            // Log sweep statistics
            if removed > 0 {
                info!("Expiry sweep: removed {} expired entries", removed);
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
