use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// Shared auto-stop deadline.
///
/// The controller arms and disarms it as the state machine commits
/// `StopAfter` transitions; the poller checks it once per tick. Clones share
/// the same deadline.
#[derive(Debug, Clone, Default)]
pub struct StopTimer {
    deadline: Arc<Mutex<Option<Instant>>>,
}

impl StopTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer `after` from now, replacing any previous deadline.
    pub fn arm(&self, after: Duration) -> Option<Instant> {
        let deadline = Instant::now().checked_add(after);
        if deadline.is_none() {
            warn!(?after, "Stop timer duration out of range; leaving timer disarmed");
        }
        *self.deadline.lock() = deadline;
        deadline
    }

    pub fn disarm(&self) {
        self.deadline.lock().take();
    }

    pub fn deadline(&self) -> Option<Instant> {
        *self.deadline.lock()
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.lock().is_some()
    }

    /// Clear the deadline and return `true` if it is at or before `now`.
    pub fn take_if_elapsed(&self, now: Instant) -> bool {
        let mut deadline = self.deadline.lock();
        match *deadline {
            Some(at) if at <= now => {
                *deadline = None;
                true
            }
            _ => false,
        }
    }
}
