//! Cycle registry
//!
//! CycleRegistry tracks every live cycle of a session so teardown code can kill
//! them all at once. It is passed explicitly to whoever spawns cycles; clones
//! share the same underlying set.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clock::{CycleClock, TokioClock};
use crate::cycle::Cycle;
use crate::id::{CycleId, next_cycle_id};

struct RegistryInner {
    cycles: Mutex<HashMap<CycleId, Cycle>>,
    clock: Arc<dyn CycleClock>,
}

/// Session-wide owner of live cycle handles
#[derive(Clone)]
pub struct CycleRegistry {
    inner: Arc<RegistryInner>,
}

impl Default for CycleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CycleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleRegistry")
            .field("cycles", &self.ids())
            .finish()
    }
}

impl CycleRegistry {
    /// Create an empty registry using real time
    pub fn new() -> Self {
        Self::with_clock(Arc::new(TokioClock))
    }

    /// Create an empty registry whose cycles wait on `clock`
    pub fn with_clock(clock: Arc<dyn CycleClock>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                cycles: Mutex::new(HashMap::new()),
                clock,
            }),
        }
    }

    /// Clock handed to every cycle spawned through this registry
    pub fn clock(&self) -> Arc<dyn CycleClock> {
        self.inner.clock.clone()
    }

    pub(crate) fn next_id(&self) -> CycleId {
        next_cycle_id()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CycleId, Cycle>> {
        // Map operations cannot leave the map half-updated, so a poisoned lock is still usable
        self.inner.cycles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Track a cycle; returns false if it was already tracked
    pub fn add(&self, cycle: Cycle) -> bool {
        let id = cycle.id();
        let mut cycles = self.lock();
        if cycles.contains_key(&id) {
            return false;
        }
        cycles.insert(id, cycle);
        true
    }

    /// Kill every tracked cycle and empty the registry
    ///
    /// The set is swapped out under the lock and killed after the lock is
    /// released, so a cycle registered concurrently lands in the fresh set
    /// instead of the one being torn down.
    pub fn kill_all(&self) -> usize {
        let snapshot: Vec<Cycle> = {
            let mut cycles = self.lock();
            std::mem::take(&mut *cycles).into_values().collect()
        };

        for cycle in &snapshot {
            cycle.kill();
        }

        if !snapshot.is_empty() {
            log::info!("Killed {} cycles", snapshot.len());
        }
        snapshot.len()
    }

    /// Drop handles of cycles that have already terminated
    pub fn prune(&self) -> usize {
        let mut cycles = self.lock();
        let before = cycles.len();
        cycles.retain(|_, cycle| cycle.is_alive());
        let pruned = before - cycles.len();
        if pruned > 0 {
            log::debug!("Pruned {} terminated cycles", pruned);
        }
        pruned
    }

    /// Number of tracked cycles
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no cycles are tracked
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether a cycle with this ID is tracked
    pub fn contains(&self, id: CycleId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Handle for a tracked cycle
    pub fn get(&self, id: CycleId) -> Option<Cycle> {
        self.lock().get(&id).cloned()
    }

    /// IDs of all tracked cycles, in creation order
    pub fn ids(&self) -> Vec<CycleId> {
        let mut ids: Vec<CycleId> = self.lock().keys().copied().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn spawn_idle(registry: &CycleRegistry, interval_ms: u64) -> Cycle {
        Cycle::builder(Duration::from_millis(interval_ms))
            .on_end(|| {})
            .spawn(registry)
            .unwrap()
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = CycleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.ids().is_empty());
    }

    #[test]
    fn test_kill_all_on_empty_registry() {
        let registry = CycleRegistry::new();
        assert_eq!(registry.kill_all(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_next_id_unique_across_registries() {
        let first = CycleRegistry::new();
        let second = CycleRegistry::new();
        let a = first.next_id();
        let b = second.next_id();
        let c = first.next_id();
        assert!(a < b && b < c);
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_is_idempotent() {
        let registry = CycleRegistry::new();
        let cycle = spawn_idle(&registry, 1000);
        assert!(!registry.add(cycle.clone()));
        assert!(!registry.add(cycle.clone()));
        assert_eq!(registry.len(), 1);
        cycle.kill();
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_registry() {
        let registry = CycleRegistry::new();
        let other = registry.clone();
        let cycle = spawn_idle(&other, 1000);
        assert!(registry.contains(cycle.id()));
        assert_eq!(registry.get(cycle.id()).unwrap().id(), cycle.id());
        registry.kill_all();
        assert!(other.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_kill_all_kills_and_clears() {
        let registry = CycleRegistry::new();
        let a = spawn_idle(&registry, 1000);
        let b = spawn_idle(&registry, 2000);
        assert_eq!(registry.ids(), vec![a.id(), b.id()]);

        assert_eq!(registry.kill_all(), 2);
        assert!(registry.is_empty());
        assert!(a.is_killed());
        assert!(b.is_killed());

        a.terminated().await;
        b.terminated().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_killed_cycle_stays_until_pruned() {
        let registry = CycleRegistry::new();
        let doomed = spawn_idle(&registry, 1000);
        let survivor = spawn_idle(&registry, 1000);

        doomed.kill();
        doomed.terminated().await;
        assert!(registry.contains(doomed.id()));

        assert_eq!(registry.prune(), 1);
        assert!(!registry.contains(doomed.id()));
        assert!(registry.contains(survivor.id()));
        assert_eq!(registry.prune(), 0);
        survivor.kill();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_from_other_registry_is_killed_by_kill_all() {
        let home = CycleRegistry::new();
        let teardown = CycleRegistry::new();
        let foreign = spawn_idle(&home, 1000);
        let local = spawn_idle(&teardown, 1000);
        assert_ne!(foreign.id(), local.id());

        assert!(teardown.add(foreign.clone()));
        assert_eq!(teardown.len(), 2);

        assert_eq!(teardown.kill_all(), 2);
        assert!(foreign.is_killed());
        assert!(local.is_killed());
        foreign.terminated().await;
        local.terminated().await;
        assert!(home.contains(foreign.id()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_unknown_id() {
        let registry = CycleRegistry::new();
        assert!(registry.get(CycleId::new(99)).is_none());
        assert!(!registry.contains(CycleId::new(99)));
    }

    #[test]
    fn test_debug_lists_ids() {
        let registry = CycleRegistry::new();
        let debug = format!("{:?}", registry);
        assert!(debug.contains("CycleRegistry"));
    }
}
