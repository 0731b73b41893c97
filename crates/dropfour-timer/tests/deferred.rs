//! Tests for one-shot deferred actions and deadlines.
//!
//! All tests run on a paused clock; `tokio::time::advance` moves time and
//! a couple of yields let the spawned timer task observe it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use dropfour_timer::{Deadline, Deferred};

// =========================================================================
// Helpers
// =========================================================================

fn counter() -> Arc<AtomicU32> {
    Arc::new(AtomicU32::new(0))
}

fn armed(delay_ms: u64, fired: &Arc<AtomicU32>) -> Deferred {
    let fired = Arc::clone(fired);
    Deferred::spawn(Duration::from_millis(delay_ms), async move {
        fired.fetch_add(1, Ordering::SeqCst);
    })
}

/// Let spawned tasks run after a clock change.
async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

// =========================================================================
// Deferred
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_deferred_fires_after_delay() {
    let fired = counter();
    let timer = armed(100, &fired);

    tokio::time::advance(Duration::from_millis(101)).await;
    settle().await;

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(timer.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_deferred_does_not_fire_early() {
    let fired = counter();
    let _timer = armed(100, &fired);

    tokio::time::advance(Duration::from_millis(99)).await;
    settle().await;

    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_deferred_fires_exactly_once() {
    let fired = counter();
    let _timer = armed(50, &fired);

    tokio::time::advance(Duration::from_millis(500)).await;
    settle().await;

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_delay_suppresses_fire() {
    let fired = counter();
    let timer = armed(100, &fired);

    timer.cancel();
    tokio::time::advance(Duration::from_millis(200)).await;
    settle().await;

    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(timer.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_after_fire_is_noop() {
    let fired = counter();
    let timer = armed(10, &fired);

    tokio::time::advance(Duration::from_millis(20)).await;
    settle().await;
    timer.cancel();
    timer.cancel();
    settle().await;

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_handle_does_not_cancel() {
    let fired = counter();
    drop(armed(30, &fired));

    tokio::time::advance(Duration::from_millis(40)).await;
    settle().await;

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_is_finished_false_while_pending() {
    let fired = counter();
    let timer = armed(100, &fired);

    settle().await;
    assert!(!timer.is_finished());
    timer.cancel();
}

// =========================================================================
// Deadline
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_deadline_not_elapsed_before_duration() {
    let deadline = Deadline::after(Duration::from_secs(30));

    tokio::time::advance(Duration::from_secs(29)).await;

    assert!(!deadline.is_elapsed());
    assert!(deadline.remaining() <= Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_elapsed_after_duration() {
    let deadline = Deadline::after(Duration::from_secs(30));

    tokio::time::advance(Duration::from_secs(31)).await;

    assert!(deadline.is_elapsed());
    assert_eq!(deadline.remaining(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_equality_distinguishes_rearm() {
    let first = Deadline::after(Duration::from_secs(30));
    assert_eq!(first, first);

    tokio::time::advance(Duration::from_secs(1)).await;
    let second = Deadline::after(Duration::from_secs(30));

    // A re-opened window carries a new deadline, so a fire captured
    // against the old one no longer matches.
    assert_ne!(first, second);
}
