//! TTL Cache - A thread-safe in-memory cache
//!
//! Stores values with per-entry TTL expiration and optional LRU eviction,
//! reporting every removal through an eviction callback.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;

pub use cache::{CacheBuilder, EvictCallback, EvictReason, Ttl, TtlCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{CacheError, Result};
