//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache instance.
//!
//! # Tasks
//! - Expiry sweeper: removes expired entries and reclaims their accounted
//!   size at configured intervals

mod sweeper;

pub use sweeper::spawn_sweeper_task;
