//! # Playback Module
//!
//! State machine driving a host media engine.
//!
//! ## Overview
//!
//! - [`state`]: [`PlaybackState`] and the [`PlaybackAction`]s that move it
//! - [`reducer`]: the pure transition function and its effects
//! - [`controller`]: the actor that serializes every input and runs effects
//! - [`StopTimer`]: the auto-stop deadline shared with the periodic poller
//!
//! Hosts hold a [`PlaybackController`], call `dispatch` from the UI, and
//! render whatever `subscribe` yields.

pub mod controller;
pub mod error;
mod poller;
pub mod reducer;
pub mod state;
mod stop_timer;

pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use reducer::{reduce, Effect, Input, Transition, FETCH_ERROR_CODE};
pub use state::{PlaybackAction, PlaybackState, Progress};
pub use stop_timer::StopTimer;
