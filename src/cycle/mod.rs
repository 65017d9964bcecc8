//! Repeating start/wait/end cycles
//!
//! A cycle fires its start callback, waits one interval, fires its end
//! callback, and repeats until killed. The playable gate pauses it between
//! iterations and the interval can be changed while it runs.

pub mod builder;
pub mod handle;
mod runner;
pub mod state;

pub use builder::{Callback, CycleBuilder};
pub use handle::{Cycle, interval_from_secs};
pub use state::CycleState;
