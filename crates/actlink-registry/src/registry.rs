//! Name-keyed action table.
//!
//! Registration takes `&mut self`, so once the registry is moved behind an
//! `Arc` for the binder and dispatcher it can no longer change. That is what
//! keeps the load phase strictly ahead of the run phase.

use std::collections::HashMap;
use std::sync::Arc;

use actlink_core::types::{ActionName, InputMethod};

use crate::descriptor::ActionDescriptor;
use crate::error::RegistryError;
use crate::gesture_table::GestureTable;

/// Registered actions in registration order, indexed by canonical name.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    entries: Vec<Arc<ActionDescriptor>>,
    index: HashMap<ActionName, usize>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a finite list of declarations.
    ///
    /// Stops at the first duplicate.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ActionDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        tracing::info!(actions = registry.len(), "Action registry loaded");
        Ok(registry)
    }

    /// Insert a descriptor under its canonical name.
    pub fn register(&mut self, descriptor: ActionDescriptor) -> Result<(), RegistryError> {
        let key = descriptor.canonical().clone();
        if self.index.contains_key(&key) {
            return Err(RegistryError::DuplicateAction(descriptor.name().to_string()));
        }
        tracing::debug!(
            action = %key,
            gesture = %descriptor.gesture(),
            method = %descriptor.input_method(),
            "Action registered"
        );
        self.index.insert(key, self.entries.len());
        self.entries.push(Arc::new(descriptor));
        Ok(())
    }

    /// Look up an action by name in any casing.
    pub fn resolve(&self, name: &str) -> Option<&Arc<ActionDescriptor>> {
        self.resolve_canonical(&ActionName::new(name))
    }

    pub fn resolve_canonical(&self, name: &ActionName) -> Option<&Arc<ActionDescriptor>> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// All descriptors in registration order. The iterator is `Clone`, so it
    /// can be restarted from any point.
    pub fn all(&self) -> std::slice::Iter<'_, Arc<ActionDescriptor>> {
        self.entries.iter()
    }

    /// Descriptors bound with the given method, in registration order.
    pub fn by_method(
        &self,
        method: InputMethod,
    ) -> impl Iterator<Item = &Arc<ActionDescriptor>> + Clone + '_ {
        self.entries
            .iter()
            .filter(move |d| d.input_method() == method)
    }

    /// Gesture index over the passive-listener actions.
    pub fn raw_listen_table(&self) -> GestureTable {
        GestureTable::from_actions(self.by_method(InputMethod::RawListen).cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
