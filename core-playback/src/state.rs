//! Playback state and the actions that drive it.

use core_library::MediaFile;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Transport snapshot shared by the `Playing` and `Pause` states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub duration: Duration,
    pub position: Duration,
    /// Auto-stop duration the user armed, if any. The matching deadline
    /// lives in the poller's [`StopTimer`](crate::StopTimer).
    pub stop_timer: Option<Duration>,
}

impl Progress {
    /// Clamp `position` into `[0, duration]`.
    pub fn clamp(&self, position: Duration) -> Duration {
        position.min(self.duration)
    }
}

/// What the player is doing. Exactly one variant is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Stop,
    /// A track was handed to the engine and is preparing.
    Init,
    Playing(Progress),
    Pause(Progress),
    /// Failure shown to the user; falls back to `Stop` on its own.
    Error { code: i32 },
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing(_))
    }

    pub fn progress(&self) -> Option<&Progress> {
        match self {
            PlaybackState::Playing(progress) | PlaybackState::Pause(progress) => Some(progress),
            PlaybackState::Stop | PlaybackState::Init | PlaybackState::Error { .. } => None,
        }
    }

    pub fn stop_timer(&self) -> Option<Duration> {
        self.progress().and_then(|progress| progress.stop_timer)
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackState::Stop => "stop",
            PlaybackState::Init => "init",
            PlaybackState::Playing(_) => "playing",
            PlaybackState::Pause(_) => "pause",
            PlaybackState::Error { .. } => "error",
        }
    }
}

/// Commands from the UI and status reports from the poller or engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackAction {
    /// Stop whatever is loaded, resolve the track URL and start it.
    StartPlaying(MediaFile),
    Play,
    Pause,
    Stop,
    SeekTo(Duration),
    /// Skip forward by the configured increment.
    ForwardOf,
    /// Skip back by the configured increment.
    ReplayOf,
    /// Arm, replace or clear the auto-stop timer. Repeating the armed value clears it.
    StopAfter(Option<Duration>),
    UpdatePlayerStatus {
        duration: Duration,
        position: Duration,
        playing: bool,
        title: Option<String>,
    },
    PropagateError(i32),
}

impl PlaybackAction {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackAction::StartPlaying(_) => "start_playing",
            PlaybackAction::Play => "play",
            PlaybackAction::Pause => "pause",
            PlaybackAction::Stop => "stop",
            PlaybackAction::SeekTo(_) => "seek_to",
            PlaybackAction::ForwardOf => "forward_of",
            PlaybackAction::ReplayOf => "replay_of",
            PlaybackAction::StopAfter(_) => "stop_after",
            PlaybackAction::UpdatePlayerStatus { .. } => "update_player_status",
            PlaybackAction::PropagateError(_) => "propagate_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_stop() {
        assert_eq!(PlaybackState::default(), PlaybackState::Stop);
    }

    #[test]
    fn progress_is_shared_by_playing_and_pause() {
        let progress = Progress {
            duration: Duration::from_secs(600),
            position: Duration::from_secs(12),
            stop_timer: Some(Duration::from_secs(900)),
        };

        assert_eq!(PlaybackState::Playing(progress).progress(), Some(&progress));
        assert_eq!(PlaybackState::Pause(progress).stop_timer(), Some(Duration::from_secs(900)));
        assert_eq!(PlaybackState::Error { code: 500 }.progress(), None);
    }

    #[test]
    fn clamp_caps_at_duration() {
        let progress = Progress {
            duration: Duration::from_secs(60),
            ..Progress::default()
        };
        assert_eq!(progress.clamp(Duration::from_secs(90)), Duration::from_secs(60));
    }
}
