//! Identifiers for cycles
//!
//! Cycle IDs come from one process-wide counter, so they are unique across
//! every registry and sort in creation order.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier of a cycle within the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleId(u64);

impl CycleId {
    /// Wrap a raw value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle-{:04}", self.0)
    }
}

/// Monotonic source of cycle IDs
///
/// Starts at 1 so that `cycle-0000` never appears in logs.
#[derive(Debug)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Create a generator starting at 1
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Issue the next ID
    pub fn next_id(&self) -> CycleId {
        CycleId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

static CYCLE_IDS: IdGenerator = IdGenerator::new();

/// Issue the next process-wide cycle ID
pub fn next_cycle_id() -> CycleId {
    CYCLE_IDS.next_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_id_display_is_zero_padded() {
        assert_eq!(CycleId::new(7).to_string(), "cycle-0007");
        assert_eq!(CycleId::new(12345).to_string(), "cycle-12345");
    }

    #[test]
    fn test_generator_starts_at_one() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next_id().get(), 1);
    }

    #[test]
    fn test_generator_is_sequential() {
        let ids = IdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert!(a < b && b < c);
        assert_eq!(c.get() - a.get(), 2);
    }

    #[test]
    fn test_next_cycle_id_is_increasing() {
        let a = next_cycle_id();
        let b = next_cycle_id();
        assert!(b > a);
    }

    #[test]
    fn test_generator_unique_across_threads() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let ids = Arc::new(IdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = ids.clone();
                std::thread::spawn(move || (0..100).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 400);
    }
}
