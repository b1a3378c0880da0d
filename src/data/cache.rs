//! Time-to-live memoisation keyed by source.
//!
//! Callers pass `now` explicitly so expiry can be driven deterministically.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Key -> (value, expiry) cache with fetch-and-replace semantics.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Live value for `key`, or `None` when missing or expired.
    pub fn get(&self, key: &K, now: Instant) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| &entry.value)
    }

    /// Store `value`, replacing any previous entry wholesale.
    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        let expires_at = now + self.ttl;
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Return the live value or run `fetch` and cache its result.
    /// A failed fetch leaves any previous entry untouched.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: K, now: Instant, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key, now) {
            debug!(?key, "cache hit");
            return Ok(value.clone());
        }
        debug!(?key, "cache miss");
        let value = fetch()?;
        self.insert(key, value.clone(), now);
        Ok(value)
    }

    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
    }

    /// Drop every expired entry.
    pub fn purge_expired(&mut self, now: Instant) {
        self.entries.retain(|_, entry| now < entry.expires_at);
    }

    /// Number of stored entries, live or not.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn repeated_calls_within_window_fetch_once() {
        let mut cache: TtlCache<String, u32> = TtlCache::new(HOUR);
        let fetches = Cell::new(0);
        let start = Instant::now();

        for offset in [0, 60, 3599] {
            let now = start + Duration::from_secs(offset);
            let value = cache
                .get_or_try_insert_with("url".to_string(), now, || {
                    fetches.set(fetches.get() + 1);
                    Ok::<_, ()>(7)
                })
                .unwrap();
            assert_eq!(value, 7);
        }
        assert_eq!(fetches.get(), 1);
    }

    #[test]
    fn expired_entry_is_refetched_and_replaced() {
        let mut cache: TtlCache<String, u32> = TtlCache::new(HOUR);
        let start = Instant::now();
        cache.insert("url".to_string(), 1, start);

        let later = start + HOUR;
        assert!(cache.get(&"url".to_string(), later).is_none());

        let value = cache
            .get_or_try_insert_with("url".to_string(), later, || Ok::<_, ()>(2))
            .unwrap();
        assert_eq!(value, 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"url".to_string(), later + HOUR - Duration::from_secs(1)), Some(&2));
        assert!(cache.get(&"url".to_string(), later + HOUR).is_none());
    }

    #[test]
    fn failed_fetch_keeps_previous_entry() {
        let mut cache: TtlCache<String, u32> = TtlCache::new(HOUR);
        let start = Instant::now();
        cache.insert("url".to_string(), 1, start);

        let later = start + HOUR * 2;
        let result = cache.get_or_try_insert_with("url".to_string(), later, || Err("offline"));
        assert_eq!(result, Err("offline"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_are_independent() {
        let mut cache: TtlCache<String, u32> = TtlCache::new(HOUR);
        let now = Instant::now();
        cache.insert("a".to_string(), 1, now);
        cache.insert("b".to_string(), 2, now);
        cache.invalidate(&"a".to_string());

        assert!(cache.get(&"a".to_string(), now).is_none());
        assert_eq!(cache.get(&"b".to_string(), now), Some(&2));
    }

    #[test]
    fn purge_drops_only_expired() {
        let mut cache: TtlCache<&'static str, u32> = TtlCache::new(HOUR);
        let start = Instant::now();
        cache.insert("old", 1, start);
        cache.insert("new", 2, start + Duration::from_secs(1800));

        cache.purge_expired(start + HOUR);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&"new", start + HOUR).is_some());
    }
}
