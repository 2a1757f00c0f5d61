//! Short-TTL response cache.
//!
//! One [`ResponseCache`] instance exists per resource family (emails,
//! labels). Entries are addressed by a deterministic fingerprint of the
//! query that produced them and expire lazily: expiry is checked on `get`,
//! never swept in the background.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// A bounded, internally-synchronized key-value cache with per-family TTL.
///
/// Capacity is enforced by least-recently-used eviction. Concurrent access
/// from multiple in-flight requests is safe; entries are idempotent fetch
/// results, so last-writer-wins on racing `put`s is acceptable.
pub struct ResponseCache<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> ResponseCache<V> {
    /// Creates a cache holding at most `capacity` entries, each valid for
    /// `ttl` after insertion.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Returns the cached value for `key` if present and not expired.
    ///
    /// A hit refreshes the entry's recency; an expired entry is dropped and
    /// treated as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => {}
            None => return None,
        }
        entries.pop(key);
        None
    }

    /// Stores `value` under `key`, evicting the least-recently-used entry
    /// when the cache is full.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.lock();
        entries.put(
            key.into(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drops every entry in this family immediately.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_hit() {
        let cache: ResponseCache<String> = ResponseCache::new(10, Duration::from_secs(60));
        assert!(cache.get("k").is_none());

        cache.put("k", "v".to_string());
        assert_eq!(cache.get("k"), Some("v".to_string()));
    }

    #[test]
    fn expired_entry_is_absent() {
        let cache: ResponseCache<u32> = ResponseCache::new(10, Duration::from_millis(10));
        cache.put("k", 1);
        std::thread::sleep(Duration::from_millis(25));
        assert!(cache.get("k").is_none());
        // Expired entries are dropped on read.
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache: ResponseCache<u32> = ResponseCache::new(2, Duration::from_secs(60));
        cache.put("a", 1);
        cache.put("b", 2);

        // Touch "a" so "b" becomes the eviction candidate.
        assert_eq!(cache.get("a"), Some(1));
        cache.put("c", 3);

        assert_eq!(cache.get("a"), Some(1));
        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn clear_drops_everything() {
        let cache: ResponseCache<u32> = ResponseCache::new(10, Duration::from_secs(60));
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn put_overwrites_existing_key() {
        let cache: ResponseCache<u32> = ResponseCache::new(10, Duration::from_secs(60));
        cache.put("a", 1);
        cache.put("a", 2);
        assert_eq!(cache.get("a"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let cache: ResponseCache<u32> = ResponseCache::new(0, Duration::from_secs(60));
        cache.put("a", 1);
        assert_eq!(cache.get("a"), Some(1));
    }
}
