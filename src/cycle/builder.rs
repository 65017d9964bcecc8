//! Cycle construction

use std::fmt;
use std::time::Duration;

use crate::cycle::handle::{Cycle, validate_interval};
use crate::cycle::runner::CycleRunner;
use crate::error::{CyclerError, Result};
use crate::registry::CycleRegistry;

/// Callback invoked by a cycle's run loop
pub type Callback = Box<dyn FnMut() + Send + 'static>;

/// Builder for a [`Cycle`]
pub struct CycleBuilder {
    interval: Duration,
    name: Option<String>,
    playable: bool,
    on_start: Option<Callback>,
    on_end: Option<Callback>,
}

impl fmt::Debug for CycleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleBuilder")
            .field("interval", &self.interval)
            .field("name", &self.name)
            .field("playable", &self.playable)
            .field("on_start", &self.on_start.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

impl CycleBuilder {
    /// Create a builder for a playable cycle with no callbacks
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            name: None,
            playable: true,
            on_start: None,
            on_end: None,
        }
    }

    /// Name used in logs and reports
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Initial state of the playable gate
    pub fn playable(mut self, playable: bool) -> Self {
        self.playable = playable;
        self
    }

    /// Called at the start of every iteration, before the interval wait
    pub fn on_start<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_start = Some(Box::new(f));
        self
    }

    /// Called at the end of every iteration, after the interval wait
    pub fn on_end<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_end = Some(Box::new(f));
        self
    }

    /// Register the cycle and start its run loop on the current tokio runtime
    ///
    /// A cycle without an end callback has nothing to do: a warning is logged,
    /// nothing is registered or spawned, and the returned handle is already
    /// terminated. It still consumes an ID, so such cycles leave gaps in the
    /// `cycle-NNNN` numbering seen in logs.
    pub fn spawn(self, registry: &CycleRegistry) -> Result<Cycle> {
        let interval = validate_interval(self.interval)?;
        let id = registry.next_id();

        let Some(on_end) = self.on_end else {
            log::warn!("{} has no end callback and will never run", id);
            return Ok(Cycle::dormant(id, self.name, interval, self.playable));
        };

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CyclerError::NoRuntime(e.to_string()))?;

        let cycle = Cycle::new(id, self.name, interval, self.playable);
        registry.add(cycle.clone());

        let runner = CycleRunner::new(
            cycle.shared.clone(),
            registry.clock(),
            self.on_start,
            on_end,
        );
        runtime.spawn(runner.run());

        Ok(cycle)
    }
}
