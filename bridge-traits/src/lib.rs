//! # Host Bridge Traits
//!
//! Capabilities the player core requires from its host but cannot provide itself.
//!
//! ## Overview
//!
//! The core never talks to an audio device, a network stack or the wall clock
//! directly. Each of those lives behind a trait defined here and implemented by
//! the host application (Android/iOS media session, desktop audio backend, HTTP
//! client for the catalog backend, ...).
//!
//! ## Traits
//!
//! ### Playback
//! - [`MediaEngine`](media::MediaEngine) - Transport control over the native player
//!   plus a [`MediaEvent`](media::MediaEvent) stream of engine-side state changes
//!
//! ### Remote data
//! - [`CatalogApi`](catalog::CatalogApi) - Track catalog listing and download URL
//!   resolution on the backend
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits report failures through [`BridgeError`](error::BridgeError).
//! The core converts these once, at its repository or controller boundary, into
//! its own typed errors; raw bridge errors never reach the playback state.
//!
//! ## Thread Safety
//!
//! Every bridge trait requires `Send + Sync` so a single implementation can be
//! shared through `Arc` between the playback actor, the poller and repository
//! callers.

pub mod catalog;
pub mod error;
pub mod media;
pub mod time;

pub use error::BridgeError;

pub use catalog::CatalogApi;
pub use media::{MediaEngine, MediaEvent};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
