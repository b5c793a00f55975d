//! Memocache - A memory-bounded in-process TTL cache
//!
//! Memoizes expensive remote calls and computed results with per-entry TTL
//! expiration, byte-budget accounting, and score-based eviction under
//! memory pressure.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod memo;
pub mod tasks;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use memo::MemoCache;
pub use tasks::spawn_sweeper_task;
