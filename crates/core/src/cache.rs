//! Bounded least-recently-used cache with a maximum entry age.
//!
//! Two independent forces remove entries:
//! - capacity: inserting a new key into a full cache evicts the least
//!   recently used entry, whatever its age;
//! - age: an entry older than `max_age` is dropped the next time it is read.
//!   There is no background sweep.
//!
//! Reads promote an entry to most-recently-used without refreshing its age.
//! Writes always store a fresh timestamp.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};

use crate::clock::{Clock, SystemClock};

/// Default number of entries kept.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default maximum entry age in milliseconds (5 minutes).
pub const DEFAULT_MAX_AGE_MS: i64 = 5 * 60 * 1000;

struct CacheEntry<V> {
    value: V,
    inserted_at: NaiveDateTime,
}

/// String-keyed memoization store bounded by size and age.
pub struct ExpiringLruCache<V> {
    entries: lru::LruCache<String, CacheEntry<V>>,
    max_age: Duration,
    clock: Arc<dyn Clock>,
}

impl<V> ExpiringLruCache<V> {
    /// Create a cache reading time from the system clock.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize, max_age: Duration) -> Self {
        Self::with_clock(capacity, max_age, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(capacity: usize, max_age: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: lru::LruCache::new(capacity),
            max_age,
            clock,
        }
    }

    /// Look up `key`, promoting it to most-recently-used.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let inserted_at = self.entries.peek(key)?.inserted_at;
        let age = self.clock.now() - inserted_at;
        if age > self.max_age {
            tracing::trace!(key, age_ms = age.num_milliseconds(), "cache entry expired");
            self.entries.pop(key);
            return None;
        }
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Insert or replace `key`.
    ///
    /// Replacing counts as a fresh insertion. Inserting a new key into a full
    /// cache evicts exactly one entry, the least recently used.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            inserted_at: self.clock.now(),
        };
        let key = key.into();
        if self.entries.len() == self.capacity() && !self.entries.contains(&key) {
            if let Some((evicted, _)) = self.entries.pop_lru() {
                tracing::trace!(key = %evicted, "cache entry evicted");
            }
        }
        self.entries.put(key, entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of occupied slots, including expired entries not yet read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    #[must_use]
    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

impl<V> Default for ExpiringLruCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, Duration::milliseconds(DEFAULT_MAX_AGE_MS))
    }
}

impl<V> fmt::Debug for ExpiringLruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringLruCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .field("max_age_ms", &self.max_age.num_milliseconds())
            .finish()
    }
}
