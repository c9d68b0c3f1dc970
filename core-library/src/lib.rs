//! # Media Library
//!
//! Data layer between the playback core and the remote catalog.
//!
//! ## Overview
//!
//! - [`cache`]: generic in-memory TTL cache with per-call [`CachePolicy`]
//! - [`repositories`]: cache-aside helpers and the remote catalog repository
//! - [`models`]: the [`MediaFile`] track model
//! - [`error`]: the [`AppError`] taxonomy every repository call returns
//!
//! Access tokens come from a `core_auth::TokenProvider`. A token failure is
//! returned before the cache or the network is touched.

pub mod cache;
pub mod error;
pub mod models;
pub mod repositories;

pub use cache::{CacheItem, CachePolicy, CacheService, Ttl, ValueCache};
pub use error::{AppError, Result};
pub use models::MediaFile;
pub use repositories::{
    handle_cached_value, handle_value, MediaRepository, PlayerRepository, RemoteMediaRepository,
};
