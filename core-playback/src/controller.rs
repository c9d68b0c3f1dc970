//! # Playback Controller
//!
//! Actor owning the playback state machine.
//!
//! ## Overview
//!
//! Every input, whether a UI command, a poller sample, an engine event or the
//! error-recovery timer, is a [`Message`] on one unbounded queue. A single
//! task takes messages off the queue one at a time and, for each:
//!
//! 1. reduces the current state with [`reduce`]
//! 2. commits the new state to the watch channel and the event bus
//! 3. runs the transition's effects against the engine and repository
//!
//! Resolving a track URL is awaited inside step 3, so anything dispatched
//! meanwhile waits in the queue and is applied afterwards, in order.
//!
//! ## Usage
//!
//! ```ignore
//! let controller = PlaybackController::new(engine, repository, settings, event_bus)?;
//! let mut states = controller.subscribe();
//!
//! controller.dispatch(PlaybackAction::StartPlaying(track));
//! states.changed().await?;
//!
//! controller.dispose().await;
//! ```

use crate::error::{PlaybackError, Result};
use crate::poller::PlaybackPoller;
use crate::reducer::{reduce, Effect, Input, Transition, FETCH_ERROR_CODE};
use crate::state::{PlaybackAction, PlaybackState};
use crate::stop_timer::StopTimer;
use bridge_traits::{MediaEngine, MediaEvent};
use core_library::PlayerRepository;
use core_runtime::config::PlaybackSettings;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Messages processed by the actor.
#[derive(Debug)]
pub(crate) enum Message {
    Input(Input),
    /// Error-recovery timer fired for the given error generation.
    Recover { generation: u64 },
    Dispose(oneshot::Sender<()>),
}

/// Handle to the playback actor.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct PlaybackController {
    sender: mpsc::UnboundedSender<Message>,
    state: watch::Receiver<PlaybackState>,
    shutdown: CancellationToken,
}

impl PlaybackController {
    /// Start the actor, the poller and the engine event pump.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        repository: Arc<dyn PlayerRepository>,
        settings: PlaybackSettings,
        event_bus: EventBus,
    ) -> Result<Self> {
        validate(&settings)?;

        let (sender, inbox) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(PlaybackState::default());
        let shutdown = CancellationToken::new();
        let stop_timer = StopTimer::new();

        PlaybackPoller::new(
            engine.clone(),
            stop_timer.clone(),
            sender.clone(),
            settings.poll_interval,
        )
        .spawn(shutdown.child_token());

        tokio::spawn(pump_engine_events(
            engine.events(),
            sender.clone(),
            shutdown.child_token(),
        ));

        let actor = PlaybackActor {
            engine,
            repository,
            settings,
            event_bus,
            state: state_tx,
            sender: sender.clone(),
            stop_timer,
            recovery: None,
            generation: 0,
            shutdown: shutdown.clone(),
        };
        tokio::spawn(actor.run(inbox));

        info!(
            poll_interval_ms = millis(settings.poll_interval),
            "Playback controller started"
        );

        Ok(Self {
            sender,
            state: state_rx,
            shutdown,
        })
    }

    /// Queue `action`. After disposal this logs and drops the action.
    pub fn dispatch(&self, action: PlaybackAction) {
        if let Err(err) = self.try_dispatch(action) {
            debug!(error = %err, "Dropping playback action");
        }
    }

    /// Queue `action`, reporting [`PlaybackError::Disposed`] after disposal.
    pub fn try_dispatch(&self, action: PlaybackAction) -> Result<()> {
        self.sender
            .send(Message::Input(Input::Action(action)))
            .map_err(|_| PlaybackError::Disposed)
    }

    /// Receiver updated after every reduction.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.clone()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PlaybackState {
        *self.state.borrow()
    }

    /// Stop polling, release the engine and publish `Disposed`.
    ///
    /// Actions queued before this call are applied first. Resolves once the
    /// actor has finished; calling it again is a no-op.
    pub async fn dispose(&self) {
        let (done, finished) = oneshot::channel();
        if self.sender.send(Message::Dispose(done)).is_err() {
            debug!("Playback controller already disposed");
            return;
        }
        let _ = finished.await;
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn validate(settings: &PlaybackSettings) -> Result<()> {
    let checks = [
        ("poll_interval", settings.poll_interval),
        ("skip_increment", settings.skip_increment),
        ("error_recovery_delay", settings.error_recovery_delay),
    ];
    for (field, value) in checks {
        if value.is_zero() {
            return Err(PlaybackError::InvalidSettings(format!(
                "{field} must be greater than zero"
            )));
        }
    }
    Ok(())
}

struct PlaybackActor {
    engine: Arc<dyn MediaEngine>,
    repository: Arc<dyn PlayerRepository>,
    settings: PlaybackSettings,
    event_bus: EventBus,
    state: watch::Sender<PlaybackState>,
    /// Used by the recovery timer to post back into the queue.
    sender: mpsc::UnboundedSender<Message>,
    stop_timer: StopTimer,
    recovery: Option<CancellationToken>,
    generation: u64,
    shutdown: CancellationToken,
}

impl PlaybackActor {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Message>) {
        loop {
            let message = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                message = inbox.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };

            match message {
                Message::Input(input) => self.apply(input).await,
                Message::Recover { generation } if generation == self.generation => {
                    self.recovery = None;
                    self.apply(Input::Recover).await;
                }
                Message::Recover { generation } => {
                    debug!(generation, current = self.generation, "Ignoring stale recovery");
                }
                Message::Dispose(done) => {
                    inbox.close();
                    self.dispose().await;
                    let _ = done.send(());
                    break;
                }
            }
        }

        self.cancel_recovery();
        debug!("Playback actor stopped");
    }

    /// Reduce `input`, commit, run effects, and keep going while effects
    /// produce follow-up inputs.
    async fn apply(&mut self, input: Input) {
        let mut next_input = Some(input);

        while let Some(input) = next_input.take() {
            let previous = *self.state.borrow();
            let Transition { state, effects } =
                reduce(&previous, &input, self.settings.skip_increment);

            self.commit(&previous, state, &input);

            for effect in effects {
                if let Some(follow_up) = self.execute(effect).await {
                    next_input = Some(follow_up);
                }
            }
        }
    }

    fn commit(&mut self, previous: &PlaybackState, next: PlaybackState, input: &Input) {
        if previous != &next {
            debug!(from = previous.name(), to = next.name(), "Playback state changed");
        }

        if !matches!(next, PlaybackState::Error { .. }) {
            self.cancel_recovery();
        }

        for event in playback_events(previous, &next, input) {
            let _ = self.event_bus.emit(CoreEvent::Playback(event));
        }

        self.state.send_replace(next);
    }

    #[instrument(skip(self), level = "debug")]
    async fn execute(&mut self, effect: Effect) -> Option<Input> {
        match effect {
            Effect::StopEngine => log_failure("stop", self.engine.stop().await),
            Effect::PlayEngine => log_failure("play", self.engine.play().await),
            Effect::PauseEngine => log_failure("pause", self.engine.pause().await),
            Effect::SeekTo(position) => log_failure("seek_to", self.engine.seek_to(position).await),
            Effect::ForwardOf(offset) => {
                log_failure("forward_of", self.engine.forward_of(offset).await)
            }
            Effect::ReplayOf(offset) => {
                log_failure("replay_of", self.engine.replay_of(offset).await)
            }
            Effect::ResolveUrl(track) => {
                let result = self.repository.url_from_id(&track.id).await;
                if let Err(err) = &result {
                    warn!(track_id = %track.id, error = %err, "Failed to resolve track URL");
                }
                return Some(Input::UrlResolved { track, result });
            }
            Effect::StartEngine {
                url,
                title,
                description,
            } => {
                if let Err(err) = self.engine.start(&url, &title, &description).await {
                    warn!(error = %PlaybackError::from(err), "Engine failed to start track");
                    return Some(Input::Action(PlaybackAction::PropagateError(FETCH_ERROR_CODE)));
                }
            }
            Effect::ArmStopTimer(after) => {
                self.stop_timer.arm(after);
            }
            Effect::DisarmStopTimer => self.stop_timer.disarm(),
            Effect::ScheduleRecovery => self.schedule_recovery(),
        }
        None
    }

    /// Post `Recover` after the configured delay unless cancelled first.
    fn schedule_recovery(&mut self) {
        self.cancel_recovery();
        self.generation = self.generation.wrapping_add(1);

        let token = self.shutdown.child_token();
        self.recovery = Some(token.clone());

        let generation = self.generation;
        let delay = self.settings.error_recovery_delay;
        let sender = self.sender.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = sender.send(Message::Recover { generation });
                }
            }
        });
    }

    fn cancel_recovery(&mut self) {
        if let Some(token) = self.recovery.take() {
            token.cancel();
        }
    }

    async fn dispose(&mut self) {
        info!("Disposing playback controller");
        self.shutdown.cancel();
        self.cancel_recovery();
        self.stop_timer.disarm();

        log_failure("dispose", self.engine.dispose().await);

        let _ = self
            .event_bus
            .emit(CoreEvent::Playback(PlaybackEvent::Disposed));
    }
}

fn log_failure(command: &str, result: bridge_traits::error::Result<()>) {
    if let Err(err) = result {
        warn!(command, error = %PlaybackError::from(err), "Media engine command failed");
    }
}

/// Translate engine events into actor messages until the engine is disposed.
async fn pump_engine_events(
    mut events: broadcast::Receiver<MediaEvent>,
    sender: mpsc::UnboundedSender<Message>,
    shutdown: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => break,
            event = events.recv() => event,
        };

        let input = match event {
            Ok(MediaEvent::PlayerStatus {
                is_playing,
                position,
                duration,
                ..
            }) => Input::Action(PlaybackAction::UpdatePlayerStatus {
                duration,
                position,
                playing: is_playing,
                title: None,
            }),
            Ok(MediaEvent::Error(code)) => Input::Action(PlaybackAction::PropagateError(code)),
            Ok(MediaEvent::Stop) => Input::EngineStopped,
            Ok(MediaEvent::Pause) => Input::EnginePaused,
            Ok(MediaEvent::None) | Ok(MediaEvent::Init) => continue,
            Ok(MediaEvent::Disposed) | Err(RecvError::Closed) => break,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Engine event pump lagged");
                continue;
            }
        };

        if sender.send(Message::Input(input)).is_err() {
            break;
        }
    }

    debug!("Engine event pump stopped");
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Bus events describing a committed transition.
fn playback_events(previous: &PlaybackState, next: &PlaybackState, input: &Input) -> Vec<PlaybackEvent> {
    let mut events = Vec::new();

    match (previous, next) {
        (_, PlaybackState::Init) => {
            if let Input::UrlResolved { track, .. } = input {
                events.push(PlaybackEvent::Started {
                    track_id: track.id.clone(),
                    title: track.name.clone(),
                });
            }
        }
        (PlaybackState::Playing(_), PlaybackState::Pause(progress)) => {
            events.push(PlaybackEvent::Paused {
                position_ms: millis(progress.position),
            });
        }
        (PlaybackState::Pause(_), PlaybackState::Playing(progress)) => {
            events.push(PlaybackEvent::Resumed {
                position_ms: millis(progress.position),
            });
        }
        (_, PlaybackState::Playing(progress))
            if previous.progress().map(|p| (p.position, p.duration))
                != Some((progress.position, progress.duration)) =>
        {
            events.push(PlaybackEvent::PositionChanged {
                position_ms: millis(progress.position),
                duration_ms: millis(progress.duration),
            });
        }
        (previous, PlaybackState::Stop) if previous != &PlaybackState::Stop => {
            events.push(PlaybackEvent::Stopped);
        }
        (previous, PlaybackState::Error { code }) if previous != next => {
            events.push(PlaybackEvent::Error { code: *code });
        }
        _ => {}
    }

    if matches!(
        input,
        Input::Action(PlaybackAction::StopAfter(_)) | Input::StopTimerElapsed
    ) {
        if previous.stop_timer() != next.stop_timer() {
            events.push(PlaybackEvent::StopTimerChanged {
                stop_after_ms: next.stop_timer().map(millis),
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Progress;
    use core_library::MediaFile;

    fn playing(position: u64) -> PlaybackState {
        PlaybackState::Playing(Progress {
            duration: Duration::from_secs(600),
            position: Duration::from_secs(position),
            stop_timer: None,
        })
    }

    #[test]
    fn test_started_event_names_the_track() {
        let input = Input::UrlResolved {
            track: MediaFile::new("rain-01", "Soft Rain", "", "tracks/rain-01.mp3"),
            result: Ok("https://resource".into()),
        };

        assert_eq!(
            playback_events(&PlaybackState::Stop, &PlaybackState::Init, &input),
            vec![PlaybackEvent::Started {
                track_id: "rain-01".into(),
                title: "Soft Rain".into()
            }]
        );
    }

    #[test]
    fn test_unchanged_position_publishes_nothing() {
        let input = Input::Action(PlaybackAction::SeekTo(Duration::from_secs(5)));
        assert!(playback_events(&playing(5), &playing(5), &input).is_empty());
    }

    #[test]
    fn test_stop_timer_change_is_published() {
        let armed = PlaybackState::Playing(Progress {
            stop_timer: Some(Duration::from_secs(60)),
            ..*playing(5).progress().unwrap()
        });
        let input = Input::Action(PlaybackAction::StopAfter(Some(Duration::from_secs(60))));

        assert_eq!(
            playback_events(&playing(5), &armed, &input),
            vec![PlaybackEvent::StopTimerChanged {
                stop_after_ms: Some(60_000)
            }]
        );
    }

    #[test]
    fn test_clearing_stop_timer_while_playing_publishes_only_timer_change() {
        let armed = PlaybackState::Playing(Progress {
            stop_timer: Some(Duration::from_secs(60)),
            ..*playing(5).progress().unwrap()
        });

        assert_eq!(
            playback_events(&armed, &playing(5), &Input::StopTimerElapsed),
            vec![PlaybackEvent::StopTimerChanged { stop_after_ms: None }]
        );
    }

    #[test]
    fn test_position_change_is_published() {
        let input = Input::Action(status_input());
        assert_eq!(
            playback_events(&playing(5), &playing(6), &input),
            vec![PlaybackEvent::PositionChanged {
                position_ms: 6_000,
                duration_ms: 600_000
            }]
        );
    }

    fn status_input() -> PlaybackAction {
        PlaybackAction::UpdatePlayerStatus {
            duration: Duration::from_secs(600),
            position: Duration::from_secs(6),
            playing: true,
            title: None,
        }
    }

    #[test]
    fn test_zero_settings_rejected() {
        let settings = PlaybackSettings {
            poll_interval: Duration::ZERO,
            ..PlaybackSettings::default()
        };
        assert!(matches!(
            validate(&settings),
            Err(PlaybackError::InvalidSettings(_))
        ));
    }
}
