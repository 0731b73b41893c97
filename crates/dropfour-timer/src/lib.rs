//! One-shot deferred actions and stored deadlines for dropfour.
//!
//! Two timers drive the server: the matchmaking fallback (pair a lone
//! player with the bot) and reconnect forfeiture (end a game whose player
//! never came back). Both share a failure mode: the timer can fire after
//! the condition it was armed for has already resolved, because `cancel`
//! is best-effort and the fire races the cancel.
//!
//! The contract here is therefore deliberately weak: a [`Deferred`] only
//! *proposes* its action. The consumer must re-check the guarding state
//! (queue membership, window deadline) before committing, and treat a
//! stale fire as a no-op. Nothing in this crate makes a fired timer
//! authoritative.
//!
//! All time goes through the Tokio clock, so `start_paused` tests can
//! drive expiry deterministically with `tokio::time::advance`.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::trace;

/// A cancellable one-shot timer: sleep for `delay`, then run the action.
///
/// `cancel` aborts the backing task. It succeeds only if the sleep has not
/// yet completed; once the action has started it runs to completion.
/// Dropping the handle does *not* cancel: a `Deferred` whose handle is
/// discarded still fires.
#[derive(Debug)]
pub struct Deferred {
    task: JoinHandle<()>,
}

impl Deferred {
    /// Arm the timer. The action runs on its own task after `delay`.
    pub fn spawn<F>(delay: Duration, action: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            trace!(delay_ms = delay.as_millis() as u64, "deferred action firing");
            action.await;
        });
        Self { task }
    }

    /// Attempt to stop the timer before it fires. Best effort: a fire that
    /// is already in flight is not recalled. Safe to call repeatedly.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the backing task has ended, by firing or by cancellation.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// A stored expiry instant, recorded when a reconnect window opens.
///
/// Comparing deadlines for equality is how a forfeiture fire proves it
/// belongs to the window it was armed for: a window that was consumed and
/// re-opened carries a different `Deadline`, so the stale fire no longer
/// matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// A deadline `duration` from now.
    pub fn after(duration: Duration) -> Self {
        Self {
            at: Instant::now() + duration,
        }
    }

    /// Whether the deadline has passed.
    pub fn is_elapsed(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Time left until expiry, zero once elapsed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }
}
