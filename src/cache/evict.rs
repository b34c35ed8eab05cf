//! Eviction Notification Module
//!
//! Reasons an entry leaves the cache and the callback that hears about it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// == Evict Reason ==
/// Why an entry was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictReason {
    /// The entry's TTL elapsed
    Expired,
    /// The entry was least recently used while the cache was over its limit
    Capacity,
    /// The entry was deleted explicitly
    Manual,
    /// The whole cache was cleared
    Clear,
}

impl EvictReason {
    /// Returns the lowercase name of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictReason::Expired => "expired",
            EvictReason::Capacity => "capacity",
            EvictReason::Manual => "manual",
            EvictReason::Clear => "clear",
        }
    }
}

impl fmt::Display for EvictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Evict Callback ==
/// Called once for every removed entry with its key, value and reason.
///
/// The cache invokes the callback while holding its exclusive lock. The
/// callback must not call back into the same cache (that deadlocks) and
/// should hand slow work off, for example to a channel.
pub type EvictCallback<K, V> = Arc<dyn Fn(K, V, EvictReason) + Send + Sync>;
