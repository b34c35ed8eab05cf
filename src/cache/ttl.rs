//! TTL Policy Module
//!
//! Resolves the TTL requested by an operation into an absolute expiration.

use std::time::{Duration, Instant};

// == TTL ==
/// How long an inserted or touched entry should live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Ttl {
    /// The entry never expires.
    Never,
    /// Use the cache's default TTL; without one the entry never expires.
    #[default]
    Default,
    /// The entry expires once this much time has passed.
    ///
    /// A zero duration behaves like [`Ttl::Default`].
    After(Duration),
}

impl Ttl {
    /// Builds a TTL from a signed millisecond count.
    ///
    /// Negative values never expire, zero uses the default TTL and positive
    /// values expire after that many milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        match millis {
            m if m < 0 => Ttl::Never,
            0 => Ttl::Default,
            m => Ttl::After(Duration::from_millis(m.unsigned_abs())),
        }
    }

    /// Shorthand for `Ttl::After(Duration::from_secs(secs))`.
    pub fn secs(secs: u64) -> Self {
        Ttl::After(Duration::from_secs(secs))
    }

    // == Resolve ==
    /// Returns the expiration instant for an entry written at `now`.
    ///
    /// # Returns
    /// - `Some(instant)` when the entry expires
    /// - `None` when it never expires, including when the deadline would not
    ///   fit in an `Instant`
    pub(crate) fn expires_at(self, now: Instant, default_ttl: Option<Duration>) -> Option<Instant> {
        let lifetime = match self {
            Ttl::Never => return None,
            Ttl::After(d) if !d.is_zero() => d,
            Ttl::Default | Ttl::After(_) => default_ttl.filter(|d| !d.is_zero())?,
        };
        now.checked_add(lifetime)
    }
}

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        if duration.is_zero() {
            Ttl::Default
        } else {
            Ttl::After(duration)
        }
    }
}
