//! Per-action press state on the local side.
//!
//! Each action moves between two states:
//! - Idle -> Active (begin)
//! - Active -> Idle (end, or cancel)
//!
//! In strict mode the tracker refuses a begin while Active and an end while
//! Idle, which guarantees the local handlers and the relayed messages come in
//! start/end pairs. In loose mode every begin and end is let through and the
//! state is only recorded.

use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

use actlink_core::types::ActionName;

/// Press state of one action for the binder's actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PressState {
    Idle,
    Active,
}

impl fmt::Display for PressState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PressState::Idle => write!(f, "Idle"),
            PressState::Active => write!(f, "Active"),
        }
    }
}

impl PressState {
    pub fn can_transition_to(&self, target: &PressState) -> bool {
        matches!(
            (self, target),
            (PressState::Idle, PressState::Active) | (PressState::Active, PressState::Idle)
        )
    }
}

/// Thread-safe record of which actions are currently held.
#[derive(Debug)]
pub struct PressTracker {
    strict: bool,
    active: Mutex<HashSet<ActionName>>,
}

impl Default for PressTracker {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PressTracker {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            active: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn state(&self, action: &ActionName) -> PressState {
        if self
            .active
            .lock()
            .expect("press tracker mutex poisoned")
            .contains(action)
        {
            PressState::Active
        } else {
            PressState::Idle
        }
    }

    /// Record a begin. Returns whether the start handler should fire.
    pub fn begin(&self, action: &ActionName) -> bool {
        self.apply(action, PressState::Active)
    }

    /// Record an end. Returns whether the end handler should fire.
    pub fn end(&self, action: &ActionName) -> bool {
        self.apply(action, PressState::Idle)
    }

    /// Drop back to Idle without firing anything. Returns whether the
    /// action was Active.
    pub fn cancel(&self, action: &ActionName) -> bool {
        let was_active = self
            .active
            .lock()
            .expect("press tracker mutex poisoned")
            .remove(action);
        if was_active {
            tracing::debug!(action = %action, "Press cancelled");
        }
        was_active
    }

    /// Force every action back to Idle.
    pub fn reset(&self) {
        let mut active = self.active.lock().expect("press tracker mutex poisoned");
        if !active.is_empty() {
            tracing::debug!(held = active.len(), "Press tracker reset");
        }
        active.clear();
    }

    fn apply(&self, action: &ActionName, target: PressState) -> bool {
        let mut active = self.active.lock().expect("press tracker mutex poisoned");
        let current = if active.contains(action) {
            PressState::Active
        } else {
            PressState::Idle
        };

        if !current.can_transition_to(&target) {
            if self.strict {
                tracing::debug!(
                    action = %action,
                    "Ignoring unpaired input: {} -> {}",
                    current,
                    target
                );
                return false;
            }
            return true;
        }

        match target {
            PressState::Active => active.insert(action.clone()),
            PressState::Idle => active.remove(action),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jump() -> ActionName {
        ActionName::new("jump")
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PressState::Idle.to_string(), "Idle");
        assert_eq!(PressState::Active.to_string(), "Active");
    }

    #[test]
    fn test_valid_transitions() {
        assert!(PressState::Idle.can_transition_to(&PressState::Active));
        assert!(PressState::Active.can_transition_to(&PressState::Idle));
        assert!(!PressState::Idle.can_transition_to(&PressState::Idle));
        assert!(!PressState::Active.can_transition_to(&PressState::Active));
    }

    #[test]
    fn test_strict_pairs_begin_and_end() {
        let tracker = PressTracker::new(true);
        assert_eq!(tracker.state(&jump()), PressState::Idle);

        assert!(tracker.begin(&jump()));
        assert_eq!(tracker.state(&jump()), PressState::Active);
        assert!(!tracker.begin(&jump()));

        assert!(tracker.end(&jump()));
        assert_eq!(tracker.state(&jump()), PressState::Idle);
        assert!(!tracker.end(&jump()));
    }

    #[test]
    fn test_strict_end_without_begin_refused() {
        let tracker = PressTracker::default();
        assert!(tracker.is_strict());
        assert!(!tracker.end(&jump()));
    }

    #[test]
    fn test_loose_lets_everything_through() {
        let tracker = PressTracker::new(false);
        assert!(tracker.end(&jump()));
        assert!(tracker.begin(&jump()));
        assert!(tracker.begin(&jump()));
        assert_eq!(tracker.state(&jump()), PressState::Active);
        assert!(tracker.end(&jump()));
        assert_eq!(tracker.state(&jump()), PressState::Idle);
    }

    #[test]
    fn test_actions_tracked_independently() {
        let tracker = PressTracker::new(true);
        let dash = ActionName::new("dash");
        assert!(tracker.begin(&jump()));
        assert!(tracker.begin(&dash));
        assert!(tracker.end(&dash));
        assert_eq!(tracker.state(&jump()), PressState::Active);
    }

    #[test]
    fn test_cancel_returns_to_idle_silently() {
        let tracker = PressTracker::new(true);
        tracker.begin(&jump());
        assert!(tracker.cancel(&jump()));
        assert!(!tracker.cancel(&jump()));
        assert!(tracker.begin(&jump()));
    }

    #[test]
    fn test_reset() {
        let tracker = PressTracker::new(true);
        tracker.begin(&jump());
        tracker.begin(&ActionName::new("dash"));
        tracker.reset();
        assert_eq!(tracker.state(&jump()), PressState::Idle);
    }
}
