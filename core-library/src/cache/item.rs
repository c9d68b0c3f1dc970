use chrono::{DateTime, Utc};

/// A cached value stamped with the time it was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheItem<V> {
    pub value: V,
    pub created_at: DateTime<Utc>,
}

impl<V> CacheItem<V> {
    pub fn new(value: V, created_at: DateTime<Utc>) -> Self {
        Self { value, created_at }
    }

    /// Whether the item is still younger than `ttl` at `now`.
    ///
    /// An item whose age equals `ttl` is already expired. A `created_at` in
    /// the future (clock stepped backwards) counts as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: std::time::Duration) -> bool {
        let age = now.signed_duration_since(self.created_at);
        match age.to_std() {
            Ok(age) => age < ttl,
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn freshness_boundary_is_exclusive() {
        let created_at = Utc::now();
        let item = CacheItem::new("v", created_at);
        let ttl = Duration::from_secs(30);

        assert!(item.is_fresh(created_at, ttl));
        assert!(item.is_fresh(created_at + chrono::Duration::seconds(29), ttl));
        assert!(!item.is_fresh(created_at + chrono::Duration::seconds(30), ttl));
    }
}
