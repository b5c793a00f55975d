//! Configuration Module
//!
//! Handles loading and validating cache configuration from environment variables.

use std::env;

use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Hard ceiling on total estimated bytes held by the cache
    pub max_size_bytes: u64,
    /// Default TTL in milliseconds for entries without an explicit TTL
    pub default_ttl_ms: u64,
    /// Background sweep interval in seconds (0 disables the background task)
    pub sweep_interval_secs: u64,
    /// Fraction of `max_size_bytes` the purger frees down to
    pub purge_threshold: f64,
    /// Fraction of `max_size_bytes` a single entry may occupy
    pub max_entry_fraction: f64,
    /// Multiplier applied to the purge target so marginal overflows don't
    /// trigger a purge on every subsequent insert
    pub purge_headroom: f64,
    /// Size charged for values the estimator cannot serialize
    pub fallback_entry_size: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_BYTES` - Total capacity in bytes (default: 100 MiB)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `CACHE_PURGE_THRESHOLD` - Purge-down-to fraction (default: 0.8)
    /// - `CACHE_MAX_ENTRY_FRACTION` - Single-entry ceiling fraction (default: 0.2)
    /// - `CACHE_PURGE_HEADROOM` - Purge target multiplier (default: 1.2)
    /// - `CACHE_FALLBACK_ENTRY_SIZE` - Estimator fallback in bytes (default: 1024)
    pub fn from_env() -> Self {
        Self {
            max_size_bytes: env::var("CACHE_MAX_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100 * 1024 * 1024),
            default_ttl_ms: env::var("CACHE_DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300_000),
            sweep_interval_secs: env::var("CACHE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            purge_threshold: env::var("CACHE_PURGE_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.8),
            max_entry_fraction: env::var("CACHE_MAX_ENTRY_FRACTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.2),
            purge_headroom: env::var("CACHE_PURGE_HEADROOM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1.2),
            fallback_entry_size: env::var("CACHE_FALLBACK_ENTRY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
        }
    }

    /// Checks the configuration for values the cache cannot operate with.
    pub fn validate(&self) -> Result<()> {
        if self.max_size_bytes == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size_bytes must be greater than zero".to_string(),
            ));
        }
        if self.default_ttl_ms == 0 {
            return Err(CacheError::InvalidConfig(
                "default_ttl_ms must be greater than zero".to_string(),
            ));
        }
        if !(self.purge_threshold > 0.0 && self.purge_threshold <= 1.0) {
            return Err(CacheError::InvalidConfig(format!(
                "purge_threshold must be in (0, 1], got {}",
                self.purge_threshold
            )));
        }
        if !(self.max_entry_fraction > 0.0 && self.max_entry_fraction <= 1.0) {
            return Err(CacheError::InvalidConfig(format!(
                "max_entry_fraction must be in (0, 1], got {}",
                self.max_entry_fraction
            )));
        }
        if self.purge_headroom < 1.0 {
            return Err(CacheError::InvalidConfig(format!(
                "purge_headroom must be at least 1.0, got {}",
                self.purge_headroom
            )));
        }
        Ok(())
    }

    /// Maximum estimated size a single entry may occupy.
    pub fn max_entry_bytes(&self) -> u64 {
        (self.max_size_bytes as f64 * self.max_entry_fraction) as u64
    }

    /// Byte level the purger frees down to.
    pub fn threshold_bytes(&self) -> u64 {
        (self.max_size_bytes as f64 * self.purge_threshold) as u64
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: 100 * 1024 * 1024,
            default_ttl_ms: 300_000,
            sweep_interval_secs: 60,
            purge_threshold: 0.8,
            max_entry_fraction: 0.2,
            purge_headroom: 1.2,
            fallback_entry_size: 1024,
        }
    }
}
