//! Turns `[[actions]]` config entries into registered descriptors.
//!
//! A config file cannot carry code, so every declared action gets logging
//! handlers that also append to a shared [`Transcript`].

use std::sync::{Arc, Mutex};

use actlink_core::config::ActlinkConfig;
use actlink_core::types::Actor;
use actlink_registry::{ActionDescriptor, ActionRegistry, RegistryError};

/// Ordered record of every handler invocation.
#[derive(Debug, Default)]
pub struct Transcript {
    lines: Mutex<Vec<String>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, side: &str, phase: &str, action: &str, actor: &Actor) {
        tracing::info!(side, phase, action, actor = %actor, "Action handler fired");
        self.lines
            .lock()
            .expect("transcript mutex poisoned")
            .push(format!("{side:<6} {phase:<5} {action} ({actor})"));
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("transcript mutex poisoned").clone()
    }
}

/// Build descriptors for every declaration, in file order.
pub fn descriptors(
    config: &ActlinkConfig,
    transcript: &Arc<Transcript>,
) -> Result<Vec<ActionDescriptor>, RegistryError> {
    config
        .actions
        .iter()
        .map(|decl| {
            let name = decl.name.clone();
            let handler = |side: &'static str, phase: &'static str| {
                let t = Arc::clone(transcript);
                let n = name.clone();
                move |actor: &Actor| t.record(side, phase, &n, actor)
            };

            let mut builder = ActionDescriptor::builder(decl.name.as_str(), decl.gesture.as_str())
                .input_method(decl.method_or(config.input.default_method))
                .touch_affordance(decl.touch_button)
                .local_on_start(handler("local", "start"))
                .remote_on_start(handler("remote", "start"));
            if decl.end_handlers {
                builder = builder
                    .local_on_end(handler("local", "end"))
                    .remote_on_end(handler("remote", "end"));
            }
            builder.build()
        })
        .collect()
}

/// Load phase: build and register every declared action.
pub fn load_registry(
    config: &ActlinkConfig,
    transcript: &Arc<Transcript>,
) -> Result<ActionRegistry, RegistryError> {
    ActionRegistry::from_descriptors(descriptors(config, transcript)?)
}
