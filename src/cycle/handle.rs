//! Cycle handle
//!
//! A [`Cycle`] is a cheap, cloneable handle to one repeating timer. The run loop
//! and every handle share the same control block; handles write the playable
//! gate, the interval and the cancellation flag, the run loop reads them at its
//! suspension points.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;

use crate::cycle::builder::CycleBuilder;
use crate::cycle::state::CycleState;
use crate::error::{CyclerError, Result};
use crate::id::CycleId;

/// Control block shared between handles and the run loop
#[derive(Debug)]
pub(crate) struct CycleShared {
    pub(crate) id: CycleId,
    pub(crate) name: Option<String>,
    pub(crate) playable: watch::Sender<bool>,
    pub(crate) cancelled: watch::Sender<bool>,
    pub(crate) interval: watch::Sender<Duration>,
    pub(crate) state: watch::Sender<CycleState>,
    pub(crate) completed: AtomicU64,
}

impl CycleShared {
    fn new(
        id: CycleId,
        name: Option<String>,
        interval: Duration,
        playable: bool,
        state: CycleState,
    ) -> Self {
        Self {
            id,
            name,
            playable: watch::Sender::new(playable),
            cancelled: watch::Sender::new(false),
            interval: watch::Sender::new(interval),
            state: watch::Sender::new(state),
            completed: AtomicU64::new(0),
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    pub(crate) fn current_interval(&self) -> Duration {
        *self.interval.borrow()
    }

    pub(crate) fn enter(&self, next: CycleState) {
        self.state.send_if_modified(|state| {
            // Terminated is absorbing
            if *state == next || state.is_terminal() {
                return false;
            }
            *state = next;
            true
        });
    }
}

/// Handle to a repeating start/wait/end cycle
///
/// Created with [`Cycle::builder`]. Clones refer to the same cycle.
#[derive(Debug, Clone)]
pub struct Cycle {
    pub(crate) shared: Arc<CycleShared>,
}

impl Cycle {
    /// Start building a cycle that repeats every `interval`
    pub fn builder(interval: Duration) -> CycleBuilder {
        CycleBuilder::new(interval)
    }

    pub(crate) fn new(id: CycleId, name: Option<String>, interval: Duration, playable: bool) -> Self {
        Self {
            shared: Arc::new(CycleShared::new(
                id,
                name,
                interval,
                playable,
                CycleState::WaitingPlayable,
            )),
        }
    }

    /// A cycle that was never started because it had nothing to call
    pub(crate) fn dormant(
        id: CycleId,
        name: Option<String>,
        interval: Duration,
        playable: bool,
    ) -> Self {
        Self {
            shared: Arc::new(CycleShared::new(
                id,
                name,
                interval,
                playable,
                CycleState::Terminated,
            )),
        }
    }

    /// Registry-issued identifier
    pub fn id(&self) -> CycleId {
        self.shared.id
    }

    /// Optional human-readable name
    pub fn name(&self) -> Option<&str> {
        self.shared.name.as_deref()
    }

    /// Open or close the playable gate
    ///
    /// Closing the gate never interrupts a wait already in progress; it only
    /// holds back the next iteration.
    pub fn set_playable(&self, playable: bool) {
        self.shared.playable.send_if_modified(|current| {
            if *current == playable {
                return false;
            }
            *current = playable;
            true
        });
        tracing::debug!(cycle = %self.id(), playable, "Playable gate changed");
    }

    /// Whether the playable gate is open
    pub fn is_playable(&self) -> bool {
        *self.shared.playable.borrow()
    }

    /// Change the interval used by every future wait
    pub fn set_interval(&self, interval: Duration) -> Result<()> {
        let interval = validate_interval(interval)?;
        self.shared.interval.send_replace(interval);
        tracing::debug!(cycle = %self.id(), interval_ms = interval.as_millis() as u64, "Interval changed");
        Ok(())
    }

    /// Change the interval, given in seconds
    pub fn set_interval_secs(&self, secs: f32) -> Result<()> {
        self.set_interval(interval_from_secs(secs)?)
    }

    /// Interval the next wait will use
    pub fn interval(&self) -> Duration {
        self.shared.current_interval()
    }

    /// Request cancellation
    ///
    /// Observed at the run loop's next check; a callback that is already
    /// executing runs to completion, but nothing fires after it.
    pub fn kill(&self) {
        let newly = self.shared.cancelled.send_if_modified(|cancelled| {
            if *cancelled {
                return false;
            }
            *cancelled = true;
            true
        });
        if newly {
            tracing::debug!(cycle = %self.id(), "Kill requested");
        }
    }

    /// Whether cancellation has been requested
    pub fn is_killed(&self) -> bool {
        self.shared.is_cancelled()
    }

    /// Current run-loop state
    pub fn state(&self) -> CycleState {
        *self.shared.state.borrow()
    }

    /// True until the run loop has terminated
    pub fn is_alive(&self) -> bool {
        !self.state().is_terminal()
    }

    /// Number of end callbacks fired so far
    pub fn completed(&self) -> u64 {
        self.shared.completed.load(Ordering::Acquire)
    }

    /// Wait until the run loop has terminated
    pub async fn terminated(&self) {
        let mut state = self.shared.state.subscribe();
        let _ = state.wait_for(|s| s.is_terminal()).await;
    }
}

/// Reject intervals that would make a cycle spin
pub(crate) fn validate_interval(interval: Duration) -> Result<Duration> {
    if interval.is_zero() {
        return Err(CyclerError::InvalidInterval(
            "interval must be greater than zero".to_string(),
        ));
    }
    Ok(interval)
}

/// Convert seconds to a validated interval
pub fn interval_from_secs(secs: f32) -> Result<Duration> {
    let interval = Duration::try_from_secs_f32(secs)
        .map_err(|e| CyclerError::InvalidInterval(format!("{} seconds: {}", secs, e)))?;
    validate_interval(interval)
}
