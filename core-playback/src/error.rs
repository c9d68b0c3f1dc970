//! # Playback Error Types

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors surfaced by the playback controller.
///
/// Most failures never reach the caller: engine and fetch errors are turned
/// into the `Error` playback state instead. These cover construction and
/// use after disposal.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// A timing setting the controller cannot run with.
    #[error("Invalid playback settings: {0}")]
    InvalidSettings(String),

    /// The media engine rejected a command.
    #[error("Media engine error: {0}")]
    Engine(#[from] BridgeError),

    /// The controller was disposed; it accepts no further actions.
    #[error("Playback controller disposed")]
    Disposed,
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
