//! Single-slot debounce timer.
//!
//! At most one regeneration is ever pending: scheduling again replaces
//! the deadline instead of adding a second one.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Quiet period required before a scheduled regeneration runs.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(1000);

/// Owned debounce timer with cancel-and-rearm semantics.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arms the timer, replacing any pending deadline.
    pub fn schedule(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Disarms the timer. Returns true if something was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves once the pending deadline passes, disarming the timer.
    ///
    /// Never resolves while nothing is scheduled. Safe to drop before
    /// completion: the deadline stays armed until it actually fires.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending().await,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}
