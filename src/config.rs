//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables
//! or any serde-supported document.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable holding the default TTL in milliseconds.
pub const ENV_DEFAULT_TTL_MS: &str = "TTL_CACHE_DEFAULT_TTL_MS";

/// Environment variable holding the maximum number of live entries.
pub const ENV_MAX_ITEMS: &str = "TTL_CACHE_MAX_ITEMS";

/// Cache configuration parameters.
///
/// The defaults describe an unbounded cache whose entries never expire unless
/// a TTL is given explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TTL in milliseconds applied when an operation asks for the default TTL.
    /// Zero means such entries never expire.
    pub default_ttl_ms: u64,
    /// Maximum number of entries; zero disables LRU eviction
    pub max_items: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `TTL_CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 0, no expiration)
    /// - `TTL_CACHE_MAX_ITEMS` - Maximum entries before LRU eviction (default: 0, unbounded)
    pub fn from_env() -> Self {
        Self {
            default_ttl_ms: env::var(ENV_DEFAULT_TTL_MS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            max_items: env::var(ENV_MAX_ITEMS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }

    /// Returns the default TTL, or `None` when it is disabled.
    pub fn default_ttl(&self) -> Option<Duration> {
        (self.default_ttl_ms > 0).then(|| Duration::from_millis(self.default_ttl_ms))
    }
}
