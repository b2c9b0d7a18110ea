//! Cancellable one-shot notifications.
//!
//! The session store asks a [`TimerFacility`] to "notify me after N ms" and
//! keeps the returned [`TimerToken`]. Expired tokens are delivered back to
//! the store by whoever drives the event loop; a token that was cancelled
//! before it fired must be ignored by the receiver.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Identifies one scheduled notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait TimerFacility {
    /// Request a notification after `after_ms` of monotonic time.
    fn schedule(&mut self, after_ms: u64) -> TimerToken;

    /// Cancel a pending notification. Unknown or already fired tokens are
    /// ignored.
    fn cancel(&mut self, token: TimerToken);
}

impl<T: TimerFacility + ?Sized> TimerFacility for Box<T> {
    fn schedule(&mut self, after_ms: u64) -> TimerToken {
        (**self).schedule(after_ms)
    }

    fn cancel(&mut self, token: TimerToken) {
        (**self).cancel(token)
    }
}

/// Timer that never fires on its own.
///
/// Pending requests are queued until the owner pops them with
/// [`ManualTimer::take_pending`], which makes phase progression fully
/// deterministic for tests and for dry-run planning.
#[derive(Debug, Default)]
pub struct ManualTimer {
    next_id: u64,
    pending: VecDeque<(TimerToken, u64)>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest pending request as if its delay had elapsed.
    pub fn take_pending(&mut self) -> Option<TimerToken> {
        self.pending.pop_front().map(|(token, _)| token)
    }

    /// Delay of the oldest pending request.
    pub fn next_delay_ms(&self) -> Option<u64> {
        self.pending.front().map(|(_, ms)| *ms)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl TimerFacility for ManualTimer {
    fn schedule(&mut self, after_ms: u64) -> TimerToken {
        self.next_id += 1;
        let token = TimerToken(self.next_id);
        self.pending.push_back((token, after_ms));
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        self.pending.retain(|(t, _)| *t != token);
    }
}

/// Timer backed by `tokio::time::sleep`.
///
/// Each request runs as its own task that sends the token over an mpsc
/// channel when it wakes. Cancelling aborts the task. Must be used from
/// within a tokio runtime.
#[derive(Debug)]
pub struct TokioTimer {
    next_id: u64,
    tx: mpsc::UnboundedSender<TimerToken>,
    tasks: HashMap<TimerToken, JoinHandle<()>>,
}

impl TokioTimer {
    /// Create the timer and the receiver that expired tokens arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerToken>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timer = Self {
            next_id: 0,
            tx,
            tasks: HashMap::new(),
        };
        (timer, rx)
    }
}

impl TimerFacility for TokioTimer {
    fn schedule(&mut self, after_ms: u64) -> TimerToken {
        self.tasks.retain(|_, handle| !handle.is_finished());

        self.next_id += 1;
        let token = TimerToken(self.next_id);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(after_ms)).await;
            // Receiver gone means the session is shutting down.
            let _ = tx.send(token);
        });
        self.tasks.insert(token, handle);
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        if let Some(handle) = self.tasks.remove(&token) {
            debug!(token = token.id(), "timer cancelled");
            handle.abort();
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}
