//! Local-role gesture binder.
//!
//! Turns input transitions into action start/end events: runs the local
//! handler, then sends the matching message over the relay link.
//!
//! DirectBind actions each take an exclusive claim on their gesture.
//! RawListen actions share a single passive subscription; each event is
//! looked up once in the [`GestureTable`] so an action fires once per
//! physical transition no matter how many actions share the gesture.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use actlink_core::types::{Actor, InputMethod, InputPhase, Role};
use actlink_registry::{ActionDescriptor, ActionRegistry, GestureTable};

use crate::channel::RelayChannel;
use crate::error::RelayError;
use crate::input::{BindRequest, InputEvent, InputHandler, InputSource, Subscription, TouchAffordance};
use crate::message::RelayMessage;
use crate::pairing::PressTracker;

/// Shared state captured by every input handler the binder installs.
struct LocalRelay {
    actor: Actor,
    channel: Arc<dyn RelayChannel>,
    tracker: Arc<PressTracker>,
    send_failures: AtomicU64,
}

impl LocalRelay {
    fn handle(&self, action: &ActionDescriptor, phase: InputPhase) {
        let key = action.canonical();
        match phase {
            InputPhase::Begin => {
                if !self.tracker.begin(key) {
                    return;
                }
                tracing::debug!(action = %key, actor = %self.actor, "Local start");
                action.local_start(&self.actor);
                self.send(RelayMessage::start(action.name()));
            }
            InputPhase::End => {
                let paired = self.tracker.end(key);
                if !action.has_local_end() || !paired {
                    return;
                }
                tracing::debug!(action = %key, actor = %self.actor, "Local end");
                action.local_end(&self.actor);
                self.send(RelayMessage::end(action.name()));
            }
            InputPhase::Cancel => {
                self.tracker.cancel(key);
            }
            InputPhase::Change => {}
        }
    }

    fn send(&self, message: RelayMessage) {
        if let Err(e) = self.channel.send(&message) {
            self.send_failures.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                link = %self.channel.name(),
                action = %message.action_name,
                ended = message.ended,
                error = %e,
                "Relay send failed; remote side will diverge"
            );
        }
    }
}

/// Binds registered actions to an input source for one local actor.
pub struct GestureBinder {
    role: Role,
    actor: Actor,
    registry: Arc<ActionRegistry>,
    channel: Option<Arc<dyn RelayChannel>>,
    touch: Option<Arc<dyn TouchAffordance>>,
    tracker: Arc<PressTracker>,
    relay: Option<Arc<LocalRelay>>,
    subscriptions: Vec<Subscription>,
    offered: Vec<String>,
}

impl GestureBinder {
    /// Create an unbound binder. Strict pairing is on by default.
    pub fn new(role: Role, actor: Actor, registry: Arc<ActionRegistry>) -> Self {
        Self {
            role,
            actor,
            registry,
            channel: None,
            touch: None,
            tracker: Arc::new(PressTracker::new(true)),
            relay: None,
            subscriptions: Vec::new(),
            offered: Vec::new(),
        }
    }

    pub fn with_channel(mut self, channel: Arc<dyn RelayChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_touch_affordance(mut self, touch: Arc<dyn TouchAffordance>) -> Self {
        self.touch = Some(touch);
        self
    }

    pub fn strict_pairing(mut self, strict: bool) -> Self {
        self.tracker = Arc::new(PressTracker::new(strict));
        self
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn tracker(&self) -> &PressTracker {
        &self.tracker
    }

    pub fn is_bound(&self) -> bool {
        self.relay.is_some()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Messages that could not be handed to the relay link while bound.
    pub fn send_failures(&self) -> u64 {
        self.relay
            .as_ref()
            .map_or(0, |r| r.send_failures.load(Ordering::Relaxed))
    }

    /// Attach every registered action to `source`.
    ///
    /// Fails without leaving any binding behind if this is not the local
    /// role, if no relay link was supplied, if the binder is already bound,
    /// or if a DirectBind gesture is already claimed.
    pub fn bind(&mut self, source: &dyn InputSource) -> Result<(), RelayError> {
        if self.role != Role::Local {
            return Err(RelayError::WrongRole {
                operation: "GestureBinder::bind",
                expected: Role::Local,
                actual: self.role,
            });
        }
        let channel = self.channel.clone().ok_or(RelayError::MissingChannel)?;
        if self.is_bound() {
            return Err(RelayError::AlreadyBound);
        }

        let relay = Arc::new(LocalRelay {
            actor: self.actor.clone(),
            channel,
            tracker: Arc::clone(&self.tracker),
            send_failures: AtomicU64::new(0),
        });

        let mut subscriptions = Vec::new();
        for action in self.registry.by_method(InputMethod::DirectBind) {
            let request = BindRequest {
                action: action.canonical().clone(),
                gesture: action.gesture().clone(),
                touch_button: action.touch_affordance(),
            };
            let handler = direct_handler(Arc::clone(&relay), Arc::clone(action));
            subscriptions.push(source.bind_exclusive(request, handler)?);
        }
        let direct = subscriptions.len();

        let table = self.registry.raw_listen_table();
        let shared = table.action_count();
        if !table.is_empty() {
            subscriptions.push(source.listen(raw_handler(Arc::clone(&relay), table)));
        }

        self.offer_touch();
        self.subscriptions = subscriptions;
        self.relay = Some(relay);
        tracing::info!(
            actor = %self.actor,
            direct,
            raw_listen = shared,
            "Gesture binder bound"
        );
        Ok(())
    }

    /// Revoke every subscription and withdraw touch affordances.
    pub fn unbind(&mut self) {
        if self.relay.take().is_none() {
            return;
        }
        self.subscriptions.clear();
        if let Some(touch) = &self.touch {
            for action in self.offered.drain(..) {
                touch.withdraw(&action);
            }
        }
        self.offered.clear();
        self.tracker.reset();
        tracing::info!(actor = %self.actor, "Gesture binder unbound");
    }

    fn offer_touch(&mut self) {
        let wanted = self
            .registry
            .by_method(InputMethod::RawListen)
            .filter(|a| a.touch_affordance());
        match &self.touch {
            Some(touch) => {
                for action in wanted {
                    touch.offer(action.name(), action.gesture());
                    self.offered.push(action.name().to_string());
                }
            }
            None => {
                for action in wanted {
                    tracing::debug!(
                        action = %action.canonical(),
                        "No touch renderer; skipping touch affordance"
                    );
                }
            }
        }
    }
}

impl Drop for GestureBinder {
    fn drop(&mut self) {
        self.unbind();
    }
}

fn direct_handler(relay: Arc<LocalRelay>, action: Arc<ActionDescriptor>) -> InputHandler {
    Arc::new(move |event: &InputEvent| relay.handle(&action, event.phase))
}

fn raw_handler(relay: Arc<LocalRelay>, table: GestureTable) -> InputHandler {
    Arc::new(move |event: &InputEvent| {
        if event.processed {
            // A consumed release still closes a press that began unconsumed.
            if event.phase == InputPhase::End {
                for action in table.actions_for(&event.gesture) {
                    relay.tracker.cancel(action.canonical());
                }
            }
            return;
        }
        for action in table.actions_for(&event.gesture) {
            relay.handle(action, event.phase);
        }
    })
}
