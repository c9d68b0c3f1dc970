//! Workspace umbrella crate.
//!
//! Re-exports the individual workspace crates so host applications can depend
//! on `relax-workspace` alone instead of wiring each core crate by hand.

pub use bridge_traits;
pub use core_auth;
pub use core_library;
pub use core_playback;
pub use core_runtime;

pub use core_library::{AppError, CachePolicy, CacheService, MediaFile, RemoteMediaRepository};
pub use core_playback::{PlaybackAction, PlaybackController, PlaybackState};
