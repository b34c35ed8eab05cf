//! Cache Builder Module
//!
//! Assembles a [`TtlCache`] from its immutable settings.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{EvictCallback, EvictReason, TtlCache};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;

// == Cache Builder ==
/// Builder for [`TtlCache`].
///
/// Everything set here is fixed for the lifetime of the cache.
pub struct CacheBuilder<K, V> {
    default_ttl: Option<Duration>,
    max_items: usize,
    on_evict: Option<EvictCallback<K, V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a builder for an unbounded cache without a default TTL.
    pub fn new() -> Self {
        Self {
            default_ttl: None,
            max_items: 0,
            on_evict: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a builder seeded from a [`Config`].
    pub fn from_config(config: &Config) -> Self {
        let builder = Self::new().max_items(config.max_items);
        match config.default_ttl() {
            Some(ttl) => builder.default_ttl(ttl),
            None => builder,
        }
    }

    /// Sets the TTL used by [`Ttl::Default`](crate::Ttl::Default). Zero disables it.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Bounds the cache to `max_items` entries with LRU eviction. Zero means unbounded.
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Registers the callback fired for every removed entry.
    ///
    /// See [`EvictCallback`] for the rules the callback must follow.
    pub fn on_evict<F>(mut self, on_evict: F) -> Self
    where
        F: Fn(K, V, EvictReason) + Send + Sync + 'static,
    {
        self.on_evict = Some(Arc::new(on_evict));
        self
    }

    /// Replaces the system clock, mostly for tests.
    pub fn clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn build(self) -> TtlCache<K, V> {
        TtlCache::from_parts(self.default_ttl, self.max_items, self.on_evict, self.clock)
    }
}

impl<K, V> Default for CacheBuilder<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
