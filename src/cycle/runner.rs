//! Cycle run loop
//!
//! One tokio task per cycle, walking `WaitingPlayable -> Running` until the
//! cancellation flag is observed, then `Terminated`:
//!
//! 1. Wait at the playable gate (woken by `set_playable(true)` or `kill`)
//! 2. Fire the start callback
//! 3. Wait one interval, captured when the wait begins
//! 4. Fire the end callback
//!
//! Cancellation is checked before and after every callback and raced against
//! both waits, so nothing fires once a kill has been observed.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::watch;

use crate::clock::CycleClock;
use crate::cycle::builder::Callback;
use crate::cycle::handle::CycleShared;
use crate::cycle::state::CycleState;

/// Owns the callbacks and drives one cycle
pub(crate) struct CycleRunner {
    shared: Arc<CycleShared>,
    clock: Arc<dyn CycleClock>,
    on_start: Option<Callback>,
    on_end: Callback,
}

impl CycleRunner {
    pub(crate) fn new(
        shared: Arc<CycleShared>,
        clock: Arc<dyn CycleClock>,
        on_start: Option<Callback>,
        on_end: Callback,
    ) -> Self {
        Self {
            shared,
            clock,
            on_start,
            on_end,
        }
    }

    /// Run until killed
    pub(crate) async fn run(mut self) {
        let id = self.shared.id;
        let mut playable = self.shared.playable.subscribe();
        let mut cancelled = self.shared.cancelled.subscribe();

        tracing::debug!(cycle = %id, name = ?self.shared.name, "Cycle started");

        loop {
            self.shared.enter(CycleState::WaitingPlayable);
            if !wait_playable(&mut playable, &mut cancelled).await {
                break;
            }

            self.shared.enter(CycleState::Running);
            if self.shared.is_cancelled() {
                break;
            }
            if let Some(on_start) = self.on_start.as_mut() {
                on_start();
            }
            if self.shared.is_cancelled() {
                break;
            }

            let interval = self.shared.current_interval();
            if !wait_interval(self.clock.as_ref(), interval, &mut cancelled).await
                || self.shared.is_cancelled()
            {
                break;
            }

            (self.on_end)();
            let completed = self.shared.completed.fetch_add(1, Ordering::AcqRel) + 1;
            tracing::trace!(cycle = %id, completed, "Cycle iteration complete");
        }

        tracing::debug!(
            cycle = %id,
            completed = self.shared.completed.load(Ordering::Acquire),
            "Cycle cancelled"
        );
    }
}

impl Drop for CycleRunner {
    // Covers normal exit, a panicking callback, and the runtime dropping the task
    fn drop(&mut self) {
        self.shared.enter(CycleState::Terminated);
    }
}

/// Sleep one interval; false if cancelled first
async fn wait_interval(
    clock: &dyn CycleClock,
    interval: Duration,
    cancelled: &mut watch::Receiver<bool>,
) -> bool {
    tokio::select! {
        biased;
        _ = wait_true(cancelled) => false,
        _ = clock.sleep(interval) => true,
    }
}

/// Wait for the gate to open; false if cancelled first
async fn wait_playable(
    playable: &mut watch::Receiver<bool>,
    cancelled: &mut watch::Receiver<bool>,
) -> bool {
    tokio::select! {
        biased;
        _ = wait_true(cancelled) => false,
        opened = wait_true(playable) => opened,
    }
}

/// Resolve once the watched flag is true; false if the sender is gone
async fn wait_true(rx: &mut watch::Receiver<bool>) -> bool {
    rx.wait_for(|v| *v).await.is_ok()
}
