//! Trailing-edge debounce timer

use std::future;
use std::time::Duration;

use tokio::time::{self, Instant};

/// Phase of a debounce timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Nothing scheduled
    Idle,
    /// A deadline is armed and will fire unless superseded
    Pending,
}

/// Per-field debounce timer holding at most one pending deadline.
///
/// `trigger` arms or re-arms the deadline; `elapsed` resolves once the
/// deadline passes and returns the timer to idle. Dropping the timer (or the
/// `elapsed` future) discards the deadline with no side effect.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Default quiet period before the email message is recomputed
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> DebounceState {
        if self.deadline.is_some() {
            DebounceState::Pending
        } else {
            DebounceState::Idle
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Record a value change: (re)start the quiet period from now
    pub fn trigger(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Drop any pending deadline
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Wait for the pending deadline. Never resolves while idle.
    pub async fn elapsed(&mut self) {
        match self.deadline {
            Some(deadline) => {
                time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => future::pending::<()>().await,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}
