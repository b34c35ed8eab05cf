//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod builder;
mod entry;
mod evict;
mod lru;
mod store;
mod ttl;


// Re-export public types
pub use builder::CacheBuilder;
pub use entry::CacheEntry;
pub use evict::{EvictCallback, EvictReason};
pub use lru::LruTracker;
pub use store::TtlCache;
pub use ttl::Ttl;
