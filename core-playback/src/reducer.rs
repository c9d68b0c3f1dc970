//! Pure transition function of the playback state machine.
//!
//! [`reduce`] never touches the engine or the network. It returns the next
//! state plus the [`Effect`]s the controller runs after committing it. Every
//! `(state, input)` pair has an arm; combinations that mean nothing in a
//! given state return the state unchanged with no effects.

use crate::state::{PlaybackAction, PlaybackState, Progress};
use core_library::{AppError, MediaFile};
use std::time::Duration;

/// State code used when a track URL cannot be resolved or the engine refuses it.
pub const FETCH_ERROR_CODE: i32 = 500;

/// Everything the state machine reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Action(PlaybackAction),
    /// Outcome of resolving the URL for a `StartPlaying` track.
    UrlResolved {
        track: MediaFile,
        result: Result<String, AppError>,
    },
    /// The engine stopped on its own (end of track, auto-stop deadline).
    EngineStopped,
    /// The engine paused on its own (notification controls, headset unplugged).
    EnginePaused,
    /// The error display delay elapsed.
    Recover,
    /// The poller consumed the auto-stop deadline and is stopping the engine.
    StopTimerElapsed,
}

impl From<PlaybackAction> for Input {
    fn from(action: PlaybackAction) -> Self {
        Input::Action(action)
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StopEngine,
    ResolveUrl(MediaFile),
    StartEngine {
        url: String,
        title: String,
        description: String,
    },
    PlayEngine,
    PauseEngine,
    SeekTo(Duration),
    ForwardOf(Duration),
    ReplayOf(Duration),
    ArmStopTimer(Duration),
    DisarmStopTimer,
    ScheduleRecovery,
}

/// Result of one reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: PlaybackState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(state: PlaybackState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn with(state: PlaybackState, effects: impl Into<Vec<Effect>>) -> Self {
        Self {
            state,
            effects: effects.into(),
        }
    }

    fn unchanged(state: &PlaybackState) -> Self {
        Self::to(*state)
    }
}

/// Compute the next state for `input`. `skip` is the forward/replay step.
pub fn reduce(state: &PlaybackState, input: &Input, skip: Duration) -> Transition {
    match input {
        Input::Action(action) => reduce_action(state, action, skip),

        Input::UrlResolved { track, result } => match result {
            Ok(url) => Transition::with(
                PlaybackState::Init,
                [Effect::StartEngine {
                    url: url.clone(),
                    title: track.name.clone(),
                    description: track.description.clone(),
                }],
            ),
            Err(_) => error_state(FETCH_ERROR_CODE),
        },

        Input::EngineStopped => match state {
            PlaybackState::Playing(_) | PlaybackState::Pause(_) => {
                Transition::with(PlaybackState::Stop, [Effect::DisarmStopTimer])
            }
            // The engine also reports the stop we asked for while loading a new track.
            PlaybackState::Stop | PlaybackState::Init | PlaybackState::Error { .. } => {
                Transition::unchanged(state)
            }
        },

        Input::EnginePaused => match state {
            PlaybackState::Playing(progress) => Transition::to(PlaybackState::Pause(*progress)),
            _ => Transition::unchanged(state),
        },

        Input::Recover => match state {
            PlaybackState::Error { .. } => Transition::to(PlaybackState::Stop),
            _ => Transition::unchanged(state),
        },

        // The deadline is gone whether or not the engine manages to stop.
        Input::StopTimerElapsed => match state {
            PlaybackState::Playing(progress) => Transition::with(
                PlaybackState::Playing(Progress { stop_timer: None, ..*progress }),
                [Effect::DisarmStopTimer],
            ),
            PlaybackState::Pause(progress) => Transition::with(
                PlaybackState::Pause(Progress { stop_timer: None, ..*progress }),
                [Effect::DisarmStopTimer],
            ),
            _ => Transition::unchanged(state),
        },
    }
}

fn reduce_action(state: &PlaybackState, action: &PlaybackAction, skip: Duration) -> Transition {
    match action {
        PlaybackAction::StartPlaying(track) => Transition::with(
            PlaybackState::Stop,
            [
                Effect::DisarmStopTimer,
                Effect::StopEngine,
                Effect::ResolveUrl(track.clone()),
            ],
        ),

        PlaybackAction::Stop => Transition::with(
            PlaybackState::Stop,
            [Effect::StopEngine, Effect::DisarmStopTimer],
        ),

        PlaybackAction::UpdatePlayerStatus {
            duration,
            position,
            playing,
            ..
        } => {
            let progress = Progress {
                duration: *duration,
                position: *position,
                stop_timer: state.stop_timer(),
            };
            if *playing {
                Transition::to(PlaybackState::Playing(progress))
            } else {
                Transition::to(PlaybackState::Pause(progress))
            }
        }

        PlaybackAction::PropagateError(code) => error_state(*code),

        PlaybackAction::Play => match state {
            PlaybackState::Pause(progress) => {
                Transition::with(PlaybackState::Playing(*progress), [Effect::PlayEngine])
            }
            _ => Transition::unchanged(state),
        },

        PlaybackAction::Pause => match state {
            PlaybackState::Playing(progress) => {
                Transition::with(PlaybackState::Pause(*progress), [Effect::PauseEngine])
            }
            _ => Transition::unchanged(state),
        },

        PlaybackAction::SeekTo(target) => match state {
            PlaybackState::Playing(progress) => {
                let position = progress.clamp(*target);
                Transition::with(
                    PlaybackState::Playing(Progress { position, ..*progress }),
                    [Effect::SeekTo(position)],
                )
            }
            _ => Transition::unchanged(state),
        },

        PlaybackAction::ForwardOf => match state {
            PlaybackState::Playing(progress) => {
                let position = progress.clamp(progress.position.saturating_add(skip));
                Transition::with(
                    PlaybackState::Playing(Progress { position, ..*progress }),
                    [Effect::ForwardOf(skip)],
                )
            }
            _ => Transition::unchanged(state),
        },

        PlaybackAction::ReplayOf => match state {
            PlaybackState::Playing(progress) => {
                let position = progress.position.saturating_sub(skip);
                Transition::with(
                    PlaybackState::Playing(Progress { position, ..*progress }),
                    [Effect::ReplayOf(skip)],
                )
            }
            _ => Transition::unchanged(state),
        },

        PlaybackAction::StopAfter(requested) => match state {
            PlaybackState::Playing(progress) => {
                let stop_timer = match requested {
                    Some(after) if progress.stop_timer != Some(*after) => Some(*after),
                    _ => None,
                };
                let effect = match stop_timer {
                    Some(after) => Effect::ArmStopTimer(after),
                    None => Effect::DisarmStopTimer,
                };
                Transition::with(
                    PlaybackState::Playing(Progress { stop_timer, ..*progress }),
                    [effect],
                )
            }
            _ => Transition::unchanged(state),
        },
    }
}

fn error_state(code: i32) -> Transition {
    Transition::with(
        PlaybackState::Error { code },
        [Effect::DisarmStopTimer, Effect::ScheduleRecovery],
    )
}
