//! Time source for cycle interval waits
//!
//! The run loop never calls `tokio::time` directly for its interval wait; it
//! goes through a [`CycleClock`] so hosts can substitute their own notion of
//! time (a frame clock, a scaled clock for fast-forward demos).

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CyclerError, Result};

/// Suspension primitive used by cycles for their interval wait
#[async_trait]
pub trait CycleClock: Send + Sync {
    /// Suspend the calling task for `duration` of this clock's time
    async fn sleep(&self, duration: Duration);
}

/// Real time, backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl CycleClock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that runs `factor` times faster than real time
#[derive(Debug, Clone, Copy)]
pub struct ScaledClock {
    factor: f64,
}

impl ScaledClock {
    /// Create a scaled clock; `factor` must be finite and positive
    pub fn new(factor: f64) -> Result<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(CyclerError::InvalidSpeed(format!(
                "factor must be finite and positive, got {}",
                factor
            )));
        }
        Ok(Self { factor })
    }

    /// Speed factor relative to real time
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Real-time duration corresponding to `duration` of scaled time
    ///
    /// Saturates at `Duration::MAX` for very slow clocks.
    pub fn scale(&self, duration: Duration) -> Duration {
        Duration::try_from_secs_f64(duration.as_secs_f64() / self.factor).unwrap_or(Duration::MAX)
    }
}

#[async_trait]
impl CycleClock for ScaledClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(self.scale(duration)).await;
    }
}
