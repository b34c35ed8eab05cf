//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.
//!
//! # Locking
//! One `RwLock` guards the entry table and the LRU tracker together, so the
//! two can never disagree about which keys exist. Lookups that neither purge
//! nor reorder (`has`, `ttl`, `peek`, `len`, `keys`) take the shared lock;
//! everything else takes the exclusive lock.
//!
//! # Eviction callback
//! The eviction callback runs while the exclusive lock is held. It must not
//! call any method on the same cache.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::cache::{CacheBuilder, CacheEntry, EvictCallback, EvictReason, LruTracker, Ttl};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Inner State ==
/// State guarded by the cache lock.
pub(crate) struct Inner<K, V> {
    pub(crate) entries: HashMap<K, CacheEntry<V>>,
    /// Present only when a maximum item count is configured
    pub(crate) lru: Option<LruTracker<K>>,
}

impl<K, V> Inner<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, entry: CacheEntry<V>) {
        if let Some(lru) = self.lru.as_mut() {
            lru.touch(key.clone());
        }
        self.entries.insert(key, entry);
    }

    fn promote<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(lru) = self.lru.as_mut() {
            lru.promote(key);
        }
    }

    fn remove<Q>(&mut self, key: &Q) -> Option<(K, CacheEntry<V>)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.entries.remove_entry(key)?;
        if let Some(lru) = self.lru.as_mut() {
            lru.remove(key);
        }
        Some(removed)
    }

    fn is_live<Q>(&self, key: &Q, now: Instant) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }
}

// == TTL Cache ==
/// A thread-safe in-memory cache with per-entry TTL and optional LRU eviction.
///
/// Expired entries stay in memory until something touches them: a lookup,
/// [`sweep`](TtlCache::sweep), or the capacity pass that follows every
/// insertion into a bounded cache.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use ttl_cache::{Ttl, TtlCache};
///
/// let cache: TtlCache<String, u32> = TtlCache::builder()
///     .default_ttl(Duration::from_secs(60))
///     .max_items(1_000)
///     .build();
///
/// cache.set("answer".to_string(), 42, Ttl::Default);
/// assert_eq!(cache.get("answer"), Some(42));
/// ```
pub struct TtlCache<K, V> {
    inner: RwLock<Inner<K, V>>,
    default_ttl: Option<Duration>,
    max_items: usize,
    on_evict: Option<EvictCallback<K, V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructors ==
    /// Creates an unbounded cache without a default TTL.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a cache from a loaded [`Config`].
    pub fn with_config(config: &Config) -> Self {
        CacheBuilder::from_config(config).build()
    }

    /// Starts building a cache.
    pub fn builder() -> CacheBuilder<K, V> {
        CacheBuilder::new()
    }

    pub(crate) fn from_parts(
        default_ttl: Option<Duration>,
        max_items: usize,
        on_evict: Option<EvictCallback<K, V>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let lru = (max_items > 0).then(LruTracker::new);
        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                lru,
            }),
            default_ttl: default_ttl.filter(|d| !d.is_zero()),
            max_items,
            on_evict,
            clock,
        }
    }

    // == Set ==
    /// Stores a value, replacing any existing entry under the key.
    ///
    /// Replacing an entry does not fire the eviction callback. If the cache is
    /// bounded, capacity is enforced afterwards.
    pub fn set(&self, key: K, value: V, ttl: impl Into<Ttl>) {
        let mut inner = self.inner.write();
        let now = self.clock.now();
        let entry = CacheEntry::new(value, ttl.into().expires_at(now, self.default_ttl));
        inner.insert(key, entry);
        self.enforce_capacity(&mut inner, now);
    }

    // == Add ==
    /// Stores a value only if no live entry exists under the key.
    ///
    /// An expired entry is purged first (firing `expired`) and then replaced.
    ///
    /// # Errors
    /// [`CacheError::AlreadyExists`] if a live entry is present. The cache is
    /// left untouched in that case.
    pub fn add(&self, key: K, value: V, ttl: impl Into<Ttl>) -> Result<()> {
        let mut inner = self.inner.write();
        let now = self.clock.now();
        self.purge_if_expired(&mut inner, &key, now);
        if inner.entries.contains_key(&key) {
            return Err(CacheError::AlreadyExists);
        }
        let entry = CacheEntry::new(value, ttl.into().expires_at(now, self.default_ttl));
        inner.insert(key, entry);
        self.enforce_capacity(&mut inner, now);
        Ok(())
    }

    // == Get ==
    /// Returns the live value for `key` and marks it as recently used.
    ///
    /// An expired entry is purged (firing `expired`) and reported as missing.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.write();
        let now = self.clock.now();
        if self.purge_if_expired(&mut inner, key, now) {
            return None;
        }
        let value = inner.entries.get(key)?.value.clone();
        inner.promote(key);
        Some(value)
    }

    // == Peek ==
    /// Returns the live value for `key` without touching recency or purging.
    pub fn peek<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let inner = self.inner.read();
        let now = self.clock.now();
        inner
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    // == Has ==
    /// Reports whether a live entry exists. Does not refresh recency.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let inner = self.inner.read();
        inner.is_live(key, self.clock.now())
    }

    // == TTL ==
    /// Returns the time left before `key` expires.
    ///
    /// `None` covers immortal entries as well as missing or expired keys; use
    /// [`has`](TtlCache::has) to tell them apart.
    pub fn ttl<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let inner = self.inner.read();
        let now = self.clock.now();
        inner
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| entry.ttl_remaining(now))
    }

    // == Touch ==
    /// Re-applies a TTL to a live entry without changing its value.
    ///
    /// `Ttl::Never` makes the entry immortal. Returns false if the key is
    /// missing or expired; an expired entry is purged.
    pub fn touch<Q>(&self, key: &Q, ttl: impl Into<Ttl>) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.write();
        let now = self.clock.now();
        if self.purge_if_expired(&mut inner, key, now) {
            return false;
        }
        let Some(entry) = inner.entries.get_mut(key) else {
            return false;
        };
        entry.expires_at = ttl.into().expires_at(now, self.default_ttl);
        inner.promote(key);
        true
    }

    // == Update ==
    /// Mutates the live value in place.
    ///
    /// The mutator works on the stored value directly, so if it fails after
    /// changing something, that change stays. Recency is refreshed only on
    /// success.
    ///
    /// # Errors
    /// - [`CacheError::NotFound`] (converted into `E`) if the key is missing
    ///   or expired; an expired entry is purged
    /// - whatever the mutator returns, unchanged
    pub fn update<Q, E, F>(&self, key: &Q, mutate: F) -> std::result::Result<(), E>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        E: From<CacheError>,
        F: FnOnce(&mut V) -> std::result::Result<(), E>,
    {
        let mut inner = self.inner.write();
        let now = self.clock.now();
        if self.purge_if_expired(&mut inner, key, now) {
            return Err(CacheError::NotFound.into());
        }
        let entry = inner.entries.get_mut(key).ok_or(CacheError::NotFound)?;
        mutate(&mut entry.value)?;
        inner.promote(key);
        Ok(())
    }

    // == Get Or Set ==
    /// Returns the live value for `key`, producing and storing it on a miss.
    ///
    /// The producer returns the value and its TTL. It runs at most once per
    /// call and under the exclusive lock, so concurrent misses on the same
    /// key produce once; every other cache call waits until it finishes.
    /// Like the eviction callback, the producer must not call into this cache.
    ///
    /// # Errors
    /// The producer's error, unchanged. Nothing is stored in that case.
    pub fn get_or_set<E, F>(&self, key: K, produce: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<(V, Ttl), E>,
    {
        // Without LRU a warm hit needs no exclusive access
        if self.max_items == 0 {
            if let Some(value) = self.peek(&key) {
                return Ok(value);
            }
        }

        let mut inner = self.inner.write();
        let now = self.clock.now();
        if !self.purge_if_expired(&mut inner, &key, now) {
            if let Some(entry) = inner.entries.get(&key) {
                let value = entry.value.clone();
                inner.promote(&key);
                return Ok(value);
            }
        }

        let (value, ttl) = produce()?;
        // A producer may have been slow
        let now = self.clock.now();
        let entry = CacheEntry::new(value.clone(), ttl.expires_at(now, self.default_ttl));
        inner.insert(key, entry);
        self.enforce_capacity(&mut inner, now);
        Ok(value)
    }

    // == Delete ==
    /// Removes the entry under `key`, firing `manual` even if it had expired.
    ///
    /// Returns true if an entry was physically present.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut inner = self.inner.write();
        match inner.remove(key) {
            Some((key, entry)) => {
                self.notify(key, entry.value, EvictReason::Manual);
                true
            }
            None => false,
        }
    }

    // == Length ==
    /// Returns the number of live entries.
    ///
    /// Counts by scanning, so expired entries that are still stored are not
    /// included.
    pub fn len(&self) -> usize {
        let inner = self.inner.read();
        let now = self.clock.now();
        inner
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Keys ==
    /// Returns the live keys in no particular order.
    pub fn keys(&self) -> Vec<K> {
        let inner = self.inner.read();
        let now = self.clock.now();
        inner
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Sweep ==
    /// Removes every expired entry.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let mut inner = self.inner.write();
        let now = self.clock.now();
        let removed = self.purge_expired(&mut inner, now);
        debug!(removed, "cache sweep finished");
        removed
    }

    // == Clear ==
    /// Removes every entry, firing `clear` once per stored entry.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        let entries = std::mem::take(&mut inner.entries);
        if let Some(lru) = inner.lru.as_mut() {
            lru.clear();
        }
        debug!(removed = entries.len(), "cache cleared");
        for (key, entry) in entries {
            self.notify(key, entry.value, EvictReason::Clear);
        }
    }

    // == Accessors ==
    /// Returns the maximum number of entries, or `None` when unbounded.
    pub fn max_items(&self) -> Option<usize> {
        (self.max_items > 0).then_some(self.max_items)
    }

    /// Returns the TTL applied by [`Ttl::Default`], if any.
    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    #[cfg(test)]
    pub(crate) fn with_inner<R>(&self, f: impl FnOnce(&Inner<K, V>) -> R) -> R {
        f(&*self.inner.read())
    }

    // == Internals ==
    /// Purges `key` if its entry has expired. Returns true if it did.
    fn purge_if_expired<Q>(&self, inner: &mut Inner<K, V>, key: &Q, now: Instant) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let expired = inner
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(now));
        if !expired {
            return false;
        }
        if let Some((key, entry)) = inner.remove(key) {
            self.notify(key, entry.value, EvictReason::Expired);
        }
        true
    }

    /// Purges every expired entry. Returns how many were removed.
    fn purge_expired(&self, inner: &mut Inner<K, V>, now: Instant) -> usize {
        let expired: Vec<K> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some((key, entry)) = inner.remove(key) {
                self.notify(key, entry.value, EvictReason::Expired);
            }
        }
        expired.len()
    }

    /// Brings a bounded cache back within its limit.
    ///
    /// Expired entries go first, then least recently used ones.
    fn enforce_capacity(&self, inner: &mut Inner<K, V>, now: Instant) {
        if self.max_items == 0 || inner.lru.is_none() {
            return;
        }
        self.purge_expired(inner, now);

        let mut evicted = 0usize;
        while inner.entries.len() > self.max_items {
            let Some(key) = inner.lru.as_mut().and_then(LruTracker::evict_oldest) else {
                break;
            };
            if let Some((key, entry)) = inner.entries.remove_entry(&key) {
                self.notify(key, entry.value, EvictReason::Capacity);
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!(evicted, max_items = self.max_items, "cache over capacity");
        }
    }

    fn notify(&self, key: K, value: V, reason: EvictReason) {
        trace!(%reason, "cache entry removed");
        if let Some(on_evict) = &self.on_evict {
            on_evict(key, value, reason);
        }
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("len", &self.len())
            .field("default_ttl", &self.default_ttl)
            .field("max_items", &self.max_items())
            .finish_non_exhaustive()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use parking_lot::Mutex;

    type Log = Arc<Mutex<Vec<(String, i32, EvictReason)>>>;

    fn cache_with(
        default_ttl: Option<Duration>,
        max_items: usize,
    ) -> (TtlCache<String, i32>, ManualClock, Log) {
        let clock = ManualClock::new();
        let log: Log = Arc::default();
        let sink = log.clone();
        let mut builder = TtlCache::builder()
            .max_items(max_items)
            .clock(clock.clone())
            .on_evict(move |k: String, v: i32, r| sink.lock().push((k, v, r)));
        if let Some(ttl) = default_ttl {
            builder = builder.default_ttl(ttl);
        }
        (builder.build(), clock, log)
    }

    fn key(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn test_store_set_and_get() {
        let (cache, _, _) = cache_with(None, 0);

        cache.set(key("key1"), 1, Ttl::Never);

        assert_eq!(cache.get("key1"), Some(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (cache, _, log) = cache_with(None, 0);

        assert_eq!(cache.get("nonexistent"), None);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_store_overwrite_fires_nothing() {
        let (cache, _, log) = cache_with(None, 0);

        cache.set(key("key1"), 1, Ttl::Never);
        cache.set(key("key1"), 2, Ttl::Never);

        assert_eq!(cache.get("key1"), Some(2));
        assert_eq!(cache.len(), 1);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_store_default_ttl_scenario() {
        let (cache, clock, log) = cache_with(Some(Duration::from_secs(1)), 0);

        cache.set(key("k"), 42, Ttl::Default);
        assert_eq!(cache.get("k"), Some(42));

        clock.advance(Duration::from_millis(1100));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
        assert_eq!(*log.lock(), vec![(key("k"), 42, EvictReason::Expired)]);
    }

    #[test]
    fn test_store_default_ttl_exact_boundary() {
        let (cache, clock, _) = cache_with(Some(Duration::from_secs(1)), 0);
        cache.set(key("k"), 1, Ttl::Default);

        clock.advance(Duration::from_secs(1));
        assert!(cache.has("k"), "live exactly at the deadline");

        clock.advance(Duration::from_nanos(1));
        assert!(!cache.has("k"));
    }

    #[test]
    fn test_store_immortal_outlives_default() {
        let (cache, clock, _) = cache_with(Some(Duration::from_secs(1)), 0);
        cache.set(key("k"), 1, Ttl::Never);

        clock.advance(Duration::from_secs(10 * 365 * 86_400));
        assert_eq!(cache.get("k"), Some(1));
    }

    #[test]
    fn test_store_add_existing_is_rejected() {
        let (cache, _, log) = cache_with(None, 0);

        assert_eq!(cache.add(key("x"), 1, Ttl::Never), Ok(()));
        assert_eq!(
            cache.add(key("x"), 2, Ttl::Never),
            Err(CacheError::AlreadyExists)
        );
        assert_eq!(cache.get("x"), Some(1));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_store_add_replaces_expired() {
        let (cache, clock, log) = cache_with(None, 0);

        cache.add(key("x"), 1, Duration::from_millis(10)).unwrap();
        clock.advance(Duration::from_millis(20));

        cache.add(key("x"), 2, Ttl::Never).unwrap();
        assert_eq!(cache.get("x"), Some(2));
        assert_eq!(*log.lock(), vec![(key("x"), 1, EvictReason::Expired)]);
    }

    #[test]
    fn test_store_has_does_not_purge() {
        let (cache, clock, log) = cache_with(None, 2);
        cache.set(key("a"), 1, Duration::from_millis(5));
        cache.set(key("b"), 2, Ttl::Never);

        clock.advance(Duration::from_millis(10));
        assert!(!cache.has("a"));
        assert!(log.lock().is_empty());
        cache.with_inner(|inner| assert_eq!(inner.entries.len(), 2));
    }

    #[test]
    fn test_store_has_does_not_promote() {
        let (cache, _, log) = cache_with(None, 2);
        cache.set(key("a"), 1, Ttl::Never);
        cache.set(key("b"), 2, Ttl::Never);

        assert!(cache.has("a"));
        cache.set(key("c"), 3, Ttl::Never);

        assert_eq!(*log.lock(), vec![(key("a"), 1, EvictReason::Capacity)]);
    }

    #[test]
    fn test_store_touch_promotes() {
        let (cache, _, log) = cache_with(None, 2);
        cache.set(key("a"), 1, Ttl::Never);
        cache.set(key("b"), 2, Ttl::Never);

        assert!(cache.touch("a", Ttl::Never));
        cache.set(key("c"), 3, Ttl::Never);

        assert_eq!(*log.lock(), vec![(key("b"), 2, EvictReason::Capacity)]);
        assert!(cache.has("a"));
    }

    #[test]
    fn test_store_failed_update_does_not_promote() {
        let (cache, _, log) = cache_with(None, 2);
        cache.set(key("a"), 1, Ttl::Never);
        cache.set(key("b"), 2, Ttl::Never);

        let result: std::result::Result<(), String> =
            cache.update("a", |_| Err("rejected".to_string()));
        assert_eq!(result, Err("rejected".to_string()));
        cache.set(key("c"), 3, Ttl::Never);

        assert_eq!(*log.lock(), vec![(key("a"), 1, EvictReason::Capacity)]);
    }

    #[test]
    fn test_store_successful_update_promotes() {
        let (cache, _, log) = cache_with(None, 2);
        cache.set(key("b"), 2, Ttl::Never);
        cache.set(key("a"), 1, Ttl::Never);

        let result: Result<()> = cache.update("b", |v| {
            *v += 1;
            Ok(())
        });
        assert_eq!(result, Ok(()));
        cache.set(key("c"), 3, Ttl::Never);

        assert_eq!(*log.lock(), vec![(key("a"), 1, EvictReason::Capacity)]);
        assert_eq!(cache.get("b"), Some(3));
    }

    #[test]
    fn test_store_ttl_reporting() {
        let (cache, clock, _) = cache_with(None, 0);
        cache.set(key("finite"), 1, Duration::from_secs(10));
        cache.set(key("immortal"), 2, Ttl::Never);

        clock.advance(Duration::from_secs(4));
        assert_eq!(cache.ttl("finite"), Some(Duration::from_secs(6)));
        assert_eq!(cache.ttl("immortal"), None);
        assert_eq!(cache.ttl("missing"), None);

        clock.advance(Duration::from_secs(7));
        assert_eq!(cache.ttl("finite"), None);
    }

    #[test]
    fn test_store_touch_extends_and_clears_ttl() {
        let (cache, clock, _) = cache_with(Some(Duration::from_millis(100)), 0);
        cache.set(key("a"), 1, Ttl::Default);

        assert!(cache.touch("a", Duration::from_millis(200)));
        clock.advance(Duration::from_millis(150));
        assert!(cache.has("a"));

        assert!(cache.touch("a", Ttl::Never));
        assert_eq!(cache.ttl("a"), None);
        clock.advance(Duration::from_secs(3600));
        assert!(cache.has("a"));

        assert!(!cache.touch("missing", Ttl::Default));
    }

    #[test]
    fn test_store_touch_purges_expired() {
        let (cache, clock, log) = cache_with(None, 0);
        cache.set(key("a"), 1, Duration::from_millis(5));
        clock.advance(Duration::from_millis(6));

        assert!(!cache.touch("a", Ttl::Never));
        assert_eq!(*log.lock(), vec![(key("a"), 1, EvictReason::Expired)]);
    }

    #[test]
    fn test_store_update() {
        let (cache, _, _) = cache_with(None, 0);
        cache.set(key("a"), 10, Ttl::Never);

        let result: Result<()> = cache.update("a", |v| {
            *v += 5;
            Ok(())
        });
        assert_eq!(result, Ok(()));
        assert_eq!(cache.get("a"), Some(15));

        let missing: Result<()> = cache.update("missing", |_| Ok(()));
        assert_eq!(missing, Err(CacheError::NotFound));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_store_update_expired_purges() {
        let (cache, clock, log) = cache_with(None, 0);
        cache.set(key("a"), 1, Duration::from_millis(5));
        clock.advance(Duration::from_millis(6));

        let result: Result<()> = cache.update("a", |_| panic!("mutator must not run"));
        assert_eq!(result, Err(CacheError::NotFound));
        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_store_update_keeps_partial_mutation() {
        let (cache, _, _) = cache_with(None, 0);
        cache.set(key("a"), 1, Ttl::Never);

        let result: anyhow::Result<()> = cache.update("a", |v| {
            *v = 99;
            Err(anyhow::anyhow!("boom"))
        });
        assert_eq!(result.unwrap_err().to_string(), "boom");
        assert_eq!(cache.get("a"), Some(99));
    }

    #[test]
    fn test_store_get_or_set_produces_once() {
        let (cache, clock, _) = cache_with(Some(Duration::from_secs(1)), 0);
        let mut builds = 0;

        for _ in 0..3 {
            let v: Result<i32> = cache.get_or_set(key("k"), || {
                builds += 1;
                Ok((7, Ttl::Default))
            });
            assert_eq!(v, Ok(7));
        }
        assert_eq!(builds, 1);

        clock.advance(Duration::from_secs(2));
        let v: Result<i32> = cache.get_or_set(key("k"), || {
            builds += 1;
            Ok((8, Ttl::Default))
        });
        assert_eq!(v, Ok(8));
        assert_eq!(builds, 2);
    }

    #[test]
    fn test_store_get_or_set_error_writes_nothing() {
        let (cache, _, _) = cache_with(None, 0);

        let v: std::result::Result<i32, String> =
            cache.get_or_set(key("k"), || Err("unavailable".to_string()));
        assert_eq!(v, Err("unavailable".to_string()));
        assert!(!cache.has("k"));
    }

    #[test]
    fn test_store_get_or_set_promotes_hit() {
        let (cache, _, log) = cache_with(None, 2);
        cache.set(key("a"), 1, Ttl::Never);
        cache.set(key("b"), 2, Ttl::Never);

        let hit: Result<i32> = cache.get_or_set(key("a"), || Ok((0, Ttl::Never)));
        assert_eq!(hit, Ok(1));

        cache.set(key("c"), 3, Ttl::Never);
        assert_eq!(*log.lock(), vec![(key("b"), 2, EvictReason::Capacity)]);
    }

    #[test]
    fn test_store_delete() {
        let (cache, clock, log) = cache_with(None, 0);
        cache.set(key("x"), 1, Ttl::Never);
        cache.set(key("stale"), 2, Duration::from_millis(1));
        clock.advance(Duration::from_millis(5));

        assert!(cache.delete("x"));
        assert!(!cache.delete("x"));
        assert!(!cache.delete("never-there"));
        assert!(cache.delete("stale"));

        assert_eq!(
            *log.lock(),
            vec![
                (key("x"), 1, EvictReason::Manual),
                (key("stale"), 2, EvictReason::Manual),
            ]
        );
    }

    #[test]
    fn test_store_len_and_keys_skip_expired() {
        let (cache, clock, _) = cache_with(None, 0);
        cache.set(key("x"), 1, Ttl::Never);
        cache.set(key("y"), 2, Duration::from_millis(10));

        let mut keys = cache.keys();
        keys.sort();
        assert_eq!(keys, vec![key("x"), key("y")]);

        clock.advance(Duration::from_millis(20));
        assert_eq!(cache.keys(), vec![key("x")]);
        assert_eq!(cache.len(), 1);
        cache.with_inner(|inner| assert_eq!(inner.entries.len(), 2));
    }

    #[test]
    fn test_store_sweep() {
        let (cache, clock, log) = cache_with(None, 0);
        cache.set(key("a"), 1, Duration::from_millis(10));
        cache.set(key("b"), 2, Ttl::Never);
        cache.set(key("c"), 3, Duration::from_millis(10));

        clock.advance(Duration::from_millis(20));
        assert_eq!(cache.sweep(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.sweep(), 0);
        assert!(log
            .lock()
            .iter()
            .all(|(_, _, reason)| *reason == EvictReason::Expired));
    }

    #[test]
    fn test_store_clear() {
        let (cache, clock, log) = cache_with(None, 3);
        cache.set(key("a"), 1, Ttl::Never);
        cache.set(key("b"), 2, Duration::from_millis(1));
        clock.advance(Duration::from_millis(5));

        cache.clear();

        assert_eq!(log.lock().len(), 2);
        assert!(log
            .lock()
            .iter()
            .all(|(_, _, reason)| *reason == EvictReason::Clear));
        assert!(cache.is_empty());
        cache.with_inner(|inner| {
            assert!(inner.entries.is_empty());
            assert!(inner.lru.as_ref().is_some_and(LruTracker::is_empty));
        });
    }

    #[test]
    fn test_store_lru_eviction_order() {
        let (cache, _, log) = cache_with(None, 3);
        for (i, k) in ["a", "b", "c"].into_iter().enumerate() {
            cache.set(key(k), i as i32, Ttl::Never);
        }
        cache.get("a");
        cache.get("b");

        cache.set(key("d"), 3, Ttl::Never);
        cache.set(key("e"), 4, Ttl::Never);

        let evicted: Vec<String> = log.lock().iter().map(|(k, _, _)| k.clone()).collect();
        assert_eq!(evicted, vec![key("c"), key("a")]);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_store_capacity_prefers_expired() {
        let (cache, clock, log) = cache_with(None, 2);
        cache.set(key("old"), 1, Ttl::Never);
        cache.set(key("short"), 2, Duration::from_millis(5));
        clock.advance(Duration::from_millis(10));

        cache.set(key("new"), 3, Ttl::Never);

        assert_eq!(*log.lock(), vec![(key("short"), 2, EvictReason::Expired)]);
        assert!(cache.has("old"));
        assert!(cache.has("new"));
    }

    #[test]
    fn test_store_unbounded_has_no_lru() {
        let (cache, _, _) = cache_with(None, 0);
        for i in 0..100 {
            cache.set(format!("k{i}"), i, Ttl::Never);
        }
        assert_eq!(cache.len(), 100);
        assert_eq!(cache.max_items(), None);
        cache.with_inner(|inner| assert!(inner.lru.is_none()));
    }

    #[test]
    fn test_store_peek_does_not_promote() {
        let (cache, _, log) = cache_with(None, 2);
        cache.set(key("a"), 1, Ttl::Never);
        cache.set(key("b"), 2, Ttl::Never);

        assert_eq!(cache.peek("a"), Some(1));
        cache.set(key("c"), 3, Ttl::Never);

        assert_eq!(*log.lock(), vec![(key("a"), 1, EvictReason::Capacity)]);
    }

    #[test]
    fn test_store_debug_omits_values() {
        let (cache, _, _) = cache_with(Some(Duration::from_secs(5)), 10);
        cache.set(key("secret"), 1234, Ttl::Never);

        let out = format!("{:?}", cache);
        assert!(out.contains("len: 1"));
        assert!(out.contains("max_items: Some(10)"));
        assert!(!out.contains("1234"));
    }
}
