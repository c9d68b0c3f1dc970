//! # Repositories
//!
//! - [`cache_aside`]: `handle_cached_value` / `handle_value`, the lookup,
//!   fetch-on-miss and error-mapping helpers every remote read goes through
//! - [`media`]: the catalog and URL repositories the UI and playback use

pub mod cache_aside;
pub mod media;

pub use cache_aside::{handle_cached_value, handle_value};
pub use media::{MediaRepository, PlayerRepository, RemoteMediaRepository};
