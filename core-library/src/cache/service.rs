use super::item::CacheItem;
use super::policy::CachePolicy;
use super::ValueCache;
use bridge_traits::time::{Clock, SystemClock};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// In-memory key/value cache interpreting a [`CachePolicy`] per call.
///
/// Every operation takes the same lock, so reads and writes from concurrent
/// callers never interleave on the map. The lock is released before the
/// caller fetches on a miss: two concurrent misses on one key both fetch.
pub struct CacheService<K, V> {
    entries: Mutex<HashMap<K, CacheItem<V>>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> CacheService<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Value for `key` if `policy` allows reading it and it has not expired.
    pub fn get_value(&self, key: &K, policy: &CachePolicy) -> Option<V> {
        let ttl = policy.reads()?;
        let now = self.clock.now();

        let entries = self.entries.lock();
        entries
            .get(key)
            .filter(|item| item.is_fresh(now, ttl))
            .map(|item| item.value.clone())
    }

    /// Store `value` stamped with the current time, unless `policy` is `Never`.
    pub fn set_value(&self, key: K, value: V, policy: &CachePolicy) {
        if !policy.writes() {
            return;
        }

        let item = CacheItem::new(value, self.clock.now());
        self.entries.lock().insert(key, item);
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        trace!(count = entries.len(), "Clearing cache");
        entries.clear();
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.lock().remove(key).map(|item| item.value)
    }

    /// Drop every entry at least `ttl` old; returns how many were removed.
    pub fn purge_expired(&self, ttl: Duration) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, item| item.is_fresh(now, ttl));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<K, V> Default for CacheService<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ValueCache<K, V> for CacheService<K, V>
where
    K: Eq + Hash + Send,
    V: Clone + Send,
{
    fn get_value(&self, key: &K, policy: &CachePolicy) -> Option<V> {
        CacheService::get_value(self, key, policy)
    }

    fn set_value(&self, key: K, value: V, policy: &CachePolicy) {
        CacheService::set_value(self, key, value, policy)
    }
}
