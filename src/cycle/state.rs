//! Run-loop state of a cycle

use std::fmt;

/// Where a cycle's run loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleState {
    /// Waiting at the playable gate before starting an iteration
    WaitingPlayable,
    /// Inside an iteration: start callback, interval wait, end callback
    Running,
    /// Cancelled or never started; absorbing
    Terminated,
}

impl CycleState {
    /// True once the cycle can never fire another callback
    pub fn is_terminal(self) -> bool {
        matches!(self, CycleState::Terminated)
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CycleState::WaitingPlayable => "waiting",
            CycleState::Running => "running",
            CycleState::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_terminated_is_terminal() {
        assert!(!CycleState::WaitingPlayable.is_terminal());
        assert!(!CycleState::Running.is_terminal());
        assert!(CycleState::Terminated.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(CycleState::WaitingPlayable.to_string(), "waiting");
        assert_eq!(CycleState::Running.to_string(), "running");
        assert_eq!(CycleState::Terminated.to_string(), "terminated");
    }
}
