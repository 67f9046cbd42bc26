//! Cooperative cancellation between pipeline stages
//!
//! The stages themselves are not interruptible; the engine checks the token
//! at stage boundaries and drops the output of the stage it stopped after.

#[cfg(test)]
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{LinkError, Result, Stage};

/// Shared cancellation flag with an optional deadline
///
/// Clones share the flag, so a caller can keep one clone and cancel a run
/// that is executing on another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
    /// Checks left before the token trips on its own
    #[cfg(test)]
    checks_left: Option<Arc<AtomicUsize>>,
}

impl CancelToken {
    /// A token that only trips when [`cancel`](Self::cancel) is called
    pub fn new() -> Self {
        Self::default()
    }

    /// Also trip once `deadline` has passed
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Also trip once `timeout` has elapsed from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// A token that lets `checks` calls to [`check`](Self::check) pass and
    /// trips on the next one
    #[cfg(test)]
    pub(crate) fn tripping_after(checks: usize) -> Self {
        Self {
            checks_left: Some(Arc::new(AtomicUsize::new(checks))),
            ..Self::default()
        }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// True once cancelled or past the deadline
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Fail with [`LinkError::Cancelled`] if the token has tripped
    pub fn check(&self, stage: Stage) -> Result<()> {
        #[cfg(test)]
        if let Some(left) = &self.checks_left {
            if left
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
                .is_err()
            {
                self.cancel();
            }
        }
        if self.is_cancelled() {
            tracing::warn!("Run cancelled after {}", stage);
            return Err(LinkError::Cancelled { stage });
        }
        Ok(())
    }
}
