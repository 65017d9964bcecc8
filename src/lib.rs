//! Cycler - cooperative repeating timers on tokio
//!
//! A cycle fires a start callback, waits an interval, fires an end callback,
//! and repeats until killed. Cycles can be paused between iterations and
//! retimed while running. A [`CycleRegistry`] tracks every live cycle so a
//! teardown step can stop them all at once.

pub mod clock;
pub mod cycle;
pub mod error;
pub mod id;
pub mod registry;

pub use clock::{CycleClock, ScaledClock, TokioClock};
pub use cycle::{Callback, Cycle, CycleBuilder, CycleState, interval_from_secs};
pub use error::{CyclerError, Result};
pub use id::CycleId;
pub use registry::CycleRegistry;
