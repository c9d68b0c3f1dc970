//! # Event Bus System
//!
//! Typed notifications published by the core crates over `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The playback controller, the media repository and the token manager each
//! publish what happened to them; hosts subscribe to drive notifications,
//! analytics or debug overlays. Publishing never blocks and never fails the
//! operation that produced the event: with no subscriber the event is dropped.
//!
//! ```text
//! ┌──────────────┐  emit   ┌──────────┐  subscribe  ┌────────────┐
//! │ TokenManager ├────────>│          ├────────────>│ Subscriber │
//! └──────────────┘         │          │             └────────────┘
//! ┌──────────────┐  emit   │ EventBus │
//! │ MediaRepo    ├────────>│          │  subscribe  ┌────────────┐
//! └──────────────┘         │          ├────────────>│ Subscriber │
//! ┌──────────────┐  emit   │          │             └────────────┘
//! │ Playback     ├────────>│          │
//! └──────────────┘         └──────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Library(LibraryEvent::CatalogLoaded { count: 12 })).ok();
//! assert_eq!(
//!     rx.recv().await.unwrap(),
//!     CoreEvent::Library(LibraryEvent::CatalogLoaded { count: 12 })
//! );
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber fell `n` events behind; it keeps
//!   receiving newer ones.
//! - **`RecvError::Closed`**: every sender is gone, treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Auth(AuthEvent),
    Library(LibraryEvent),
    Playback(PlaybackEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
            CoreEvent::Library(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::AuthError { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Library(LibraryEvent::CatalogLoaded { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Started { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::Disposed) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Authentication Events
// ============================================================================

/// Access-token lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// A new token is being requested from the token source.
    TokenRefreshing,
    /// A new token is available.
    TokenRefreshed {
        /// Expiry as Unix epoch seconds, when the source reports one.
        expires_at: Option<i64>,
    },
    /// The token source failed.
    AuthError { message: String },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::TokenRefreshing => "Refreshing access token",
            AuthEvent::TokenRefreshed { .. } => "Access token refreshed",
            AuthEvent::AuthError { .. } => "Authentication error",
        }
    }
}

// ============================================================================
// Library Events
// ============================================================================

/// Catalog and cache notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    /// The catalog was served, from cache or from the backend.
    CatalogLoaded { count: usize },
    /// All cached catalog data and URLs were dropped.
    CacheCleared,
}

impl LibraryEvent {
    fn description(&self) -> &str {
        match self {
            LibraryEvent::CatalogLoaded { .. } => "Catalog loaded",
            LibraryEvent::CacheCleared => "Library cache cleared",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Playback transitions, published after the state machine commits them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A track was handed to the engine.
    Started { track_id: String, title: String },
    Paused { position_ms: u64 },
    Resumed { position_ms: u64 },
    Stopped,
    /// Periodic transport update.
    PositionChanged { position_ms: u64, duration_ms: u64 },
    /// The auto-stop timer was armed (`Some`) or cleared (`None`).
    StopTimerChanged { stop_after_ms: Option<u64> },
    /// Playback entered the error state. It recovers on its own.
    Error { code: i32 },
    /// Terminal signal: the playback subsystem was disposed.
    Disposed,
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::Stopped => "Playback stopped",
            PlaybackEvent::PositionChanged { .. } => "Playback position changed",
            PlaybackEvent::StopTimerChanged { .. } => "Stop timer changed",
            PlaybackEvent::Error { .. } => "Playback error",
            PlaybackEvent::Disposed => "Playback disposed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus. Cloning shares the same underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a bus buffering at most `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers reached, or an error when nobody
    /// is listening. Publishers in the core ignore that error.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with an optional predicate.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let playback_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Playback(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by [`EventStream::recv`].
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next matching event.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Returns the next matching event already buffered, or `None`.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_without_subscribers_is_an_error() {
        let bus = EventBus::new(10);
        assert!(bus.emit(CoreEvent::Playback(PlaybackEvent::Stopped)).is_err());
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_event() {
        let bus = EventBus::new(10);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let event = CoreEvent::Playback(PlaybackEvent::Error { code: 500 });
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_filtered_stream_skips_other_domains() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Playback(_)));

        bus.emit(CoreEvent::Auth(AuthEvent::TokenRefreshing)).unwrap();
        bus.emit(CoreEvent::Library(LibraryEvent::CacheCleared)).unwrap();
        bus.emit(CoreEvent::Playback(PlaybackEvent::Disposed)).unwrap();

        assert_eq!(
            stream.recv().await.unwrap(),
            CoreEvent::Playback(PlaybackEvent::Disposed)
        );
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();

        for position_ms in 0..5 {
            bus.emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                position_ms,
                duration_ms: 10,
            }))
            .unwrap();
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(
            CoreEvent::Playback(PlaybackEvent::Error { code: 1 }).severity(),
            EventSeverity::Error
        );
        assert_eq!(
            CoreEvent::Auth(AuthEvent::AuthError {
                message: "expired".into()
            })
            .severity(),
            EventSeverity::Error
        );
        assert_eq!(
            CoreEvent::Library(LibraryEvent::CatalogLoaded { count: 3 }).severity(),
            EventSeverity::Info
        );
        assert_eq!(
            CoreEvent::Playback(PlaybackEvent::Stopped).severity(),
            EventSeverity::Debug
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Playback(PlaybackEvent::StopTimerChanged {
            stop_after_ms: Some(600_000),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Playback\""));
        assert!(json.contains("\"event\":\"StopTimerChanged\""));

        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_try_recv_empty() {
        let bus = EventBus::default();
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());
    }
}
