//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the player core crates:
//! - Logging and tracing setup
//! - Configuration (playback timings, cache TTLs)
//! - Event bus for auth, library and playback notifications
//!
//! ## Overview
//!
//! Nothing in here knows about tracks or players. The other crates depend on
//! it for their logging conventions, their settings and the broadcast channel
//! they publish domain events on.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
