//! Gesture to actions multimap.
//!
//! One physical input transition can map to several logical actions. The
//! table makes that fan-out explicit: the binder looks up the gesture once
//! and fires each listed action exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use actlink_core::types::GestureId;

use crate::descriptor::ActionDescriptor;

/// Actions grouped by gesture. Within a gesture, registration order is kept.
#[derive(Debug, Default, Clone)]
pub struct GestureTable {
    by_gesture: HashMap<GestureId, Vec<Arc<ActionDescriptor>>>,
}

impl GestureTable {
    pub fn from_actions(actions: impl IntoIterator<Item = Arc<ActionDescriptor>>) -> Self {
        let mut by_gesture: HashMap<GestureId, Vec<Arc<ActionDescriptor>>> = HashMap::new();
        for action in actions {
            by_gesture
                .entry(action.gesture().clone())
                .or_default()
                .push(action);
        }
        Self { by_gesture }
    }

    /// Actions bound to `gesture`; empty when none.
    pub fn actions_for(&self, gesture: &GestureId) -> &[Arc<ActionDescriptor>] {
        self.by_gesture
            .get(gesture)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn gestures(&self) -> impl Iterator<Item = &GestureId> {
        self.by_gesture.keys()
    }

    /// Number of (gesture, action) pairs.
    pub fn action_count(&self) -> usize {
        self.by_gesture.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_gesture.is_empty()
    }
}
