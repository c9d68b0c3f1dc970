//! Periodic transport sampling.
//!
//! While the engine reports that it is playing, the poller samples position
//! and duration once per period and posts an `UpdatePlayerStatus` through
//! the controller's queue. It never samples while paused: the UI keeps the
//! last reported position until playback resumes. The poller also owns the
//! auto-stop check: once the deadline passes it tells the controller the timer
//! is spent, then stops the engine directly.

use crate::controller::Message;
use crate::reducer::Input;
use crate::state::PlaybackAction;
use crate::stop_timer::StopTimer;
use bridge_traits::MediaEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub(crate) struct PlaybackPoller {
    engine: Arc<dyn MediaEngine>,
    stop_timer: StopTimer,
    sender: UnboundedSender<Message>,
    period: Duration,
}

impl PlaybackPoller {
    pub(crate) fn new(
        engine: Arc<dyn MediaEngine>,
        stop_timer: StopTimer,
        sender: UnboundedSender<Message>,
        period: Duration,
    ) -> Self {
        Self {
            engine,
            stop_timer,
            sender,
            period,
        }
    }

    /// Run until `shutdown` is cancelled or the controller goes away.
    pub(crate) fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        if !self.tick().await {
                            break;
                        }
                    }
                }
            }

            debug!("Playback poller stopped");
        })
    }

    /// One sampling pass. Returns `false` once the controller stopped listening.
    async fn tick(&self) -> bool {
        if self.stop_timer.take_if_elapsed(Instant::now()) {
            info!("Stop timer elapsed, stopping playback");
            if self
                .sender
                .send(Message::Input(Input::StopTimerElapsed))
                .is_err()
            {
                return false;
            }
            if let Err(err) = self.engine.stop().await {
                warn!(error = %err, "Engine failed to stop at deadline");
            }
            return true;
        }

        if !self.engine.is_playing() {
            return true;
        }

        let status = PlaybackAction::UpdatePlayerStatus {
            duration: self.engine.duration(),
            position: self.engine.position(),
            playing: true,
            title: self.engine.title(),
        };
        self.sender
            .send(Message::Input(Input::Action(status)))
            .is_ok()
    }
}
