//! # Cache Module
//!
//! Generic TTL cache used by the repositories.
//!
//! ## Overview
//!
//! - [`CacheItem`] pairs a value with the time it was stored
//! - [`CachePolicy`] tells each call site whether to read, write, or both
//! - [`CacheService`] is the lock-guarded map interpreting those policies
//!
//! Expired and missing keys look the same to callers: both are `None`.

pub mod item;
pub mod policy;
pub mod service;

pub use item::CacheItem;
pub use policy::{CachePolicy, Ttl};
pub use service::CacheService;

/// The read/write surface the cache-aside helpers need.
///
/// [`CacheService`] is the production implementation.
pub trait ValueCache<K, V>: Send + Sync {
    fn get_value(&self, key: &K, policy: &CachePolicy) -> Option<V>;

    fn set_value(&self, key: K, value: V, policy: &CachePolicy);
}
