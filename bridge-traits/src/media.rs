//! Media engine bridge.
//!
//! The host owns the actual audio player (ExoPlayer, AVPlayer, rodio, ...).
//! The core drives it through [`MediaEngine`] and learns about engine-side
//! changes (end of track, decode failures, notification controls) from the
//! [`MediaEvent`] stream returned by [`MediaEngine::events`].

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::broadcast;

/// Event emitted by the host media engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// Nothing loaded yet.
    None,
    /// A source was handed to the engine and is preparing.
    Init,
    /// Transport snapshot pushed by the engine itself.
    PlayerStatus {
        is_playing: bool,
        position: Duration,
        duration: Duration,
        /// Absolute auto-stop deadline the engine knows about, if any.
        stop_at: Option<DateTime<Utc>>,
    },
    /// Playback paused outside of the core (headset unplugged, notification button).
    Pause,
    /// Playback stopped, either on request or because the track ended.
    Stop,
    /// Engine-level failure, e.g. a decoder error code.
    Error(i32),
    /// Engine released; no further events follow.
    Disposed,
}

/// Transport control over a host media player.
///
/// Control methods are async because most engines marshal onto a main/audio
/// thread. The sampling accessors (`is_playing`, `position`, `duration`,
/// `title`) must be cheap: the poller calls them once per tick.
#[async_trait::async_trait]
pub trait MediaEngine: Send + Sync {
    /// Load `url` and start playing it, replacing whatever was loaded.
    async fn start(&self, url: &str, title: &str, description: &str) -> Result<()>;

    /// Resume playback.
    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Stop playback and unload the current source.
    async fn stop(&self) -> Result<()>;

    /// Seek to an absolute position.
    async fn seek_to(&self, position: Duration) -> Result<()>;

    /// Skip forward by `offset`, clamped by the engine to the track length.
    async fn forward_of(&self, offset: Duration) -> Result<()>;

    /// Skip backward by `offset`, clamped by the engine to the start.
    async fn replay_of(&self, offset: Duration) -> Result<()>;

    /// Release native resources. The engine emits [`MediaEvent::Disposed`] last.
    async fn dispose(&self) -> Result<()>;

    fn is_playing(&self) -> bool;

    fn position(&self) -> Duration;

    fn duration(&self) -> Duration;

    /// Title of the loaded source, if any.
    fn title(&self) -> Option<String>;

    /// Subscribe to engine events. Each call returns an independent receiver.
    fn events(&self) -> broadcast::Receiver<MediaEvent>;
}
