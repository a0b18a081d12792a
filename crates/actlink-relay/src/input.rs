//! Input source contract and the in-process [`InputHub`].
//!
//! An input source offers two ways to attach to gestures:
//! - an exclusive claim, one owner per gesture, which consumes the event
//! - a passive listener that sees every raw event
//!
//! Both return a [`Subscription`] guard. Dropping the guard revokes the
//! binding, so a torn-down actor never leaves a callback behind.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};

use actlink_core::types::{ActionName, GestureId, InputPhase};

use crate::error::RelayError;

/// One raw input transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub gesture: GestureId,
    pub phase: InputPhase,
    /// Already consumed by a higher-priority layer (UI, text box, exclusive
    /// binding). Passive listeners must ignore such events.
    pub processed: bool,
}

impl InputEvent {
    pub fn new(gesture: impl Into<GestureId>, phase: InputPhase) -> Self {
        Self {
            gesture: gesture.into(),
            phase,
            processed: false,
        }
    }

    pub fn begin(gesture: impl Into<GestureId>) -> Self {
        Self::new(gesture, InputPhase::Begin)
    }

    pub fn end(gesture: impl Into<GestureId>) -> Self {
        Self::new(gesture, InputPhase::End)
    }

    pub fn cancel(gesture: impl Into<GestureId>) -> Self {
        Self::new(gesture, InputPhase::Cancel)
    }

    pub fn processed(mut self, processed: bool) -> Self {
        self.processed = processed;
        self
    }
}

/// Callback the input source invokes for each delivered event.
pub type InputHandler = Arc<dyn Fn(&InputEvent) + Send + Sync>;

/// Parameters of an exclusive claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    pub action: ActionName,
    pub gesture: GestureId,
    /// Ask the source to also offer an on-screen button for this action.
    pub touch_button: bool,
}

/// Anything that can deliver gesture events.
pub trait InputSource {
    /// Claim `request.gesture` for one action.
    ///
    /// Fails with [`RelayError::GestureClaimed`] while another live claim
    /// holds the gesture.
    fn bind_exclusive(
        &self,
        request: BindRequest,
        handler: InputHandler,
    ) -> Result<Subscription, RelayError>;

    /// Receive every raw event.
    fn listen(&self, handler: InputHandler) -> Subscription;
}

/// On-screen trigger renderer for actions that ask for one.
pub trait TouchAffordance: Send + Sync {
    fn offer(&self, action: &str, gesture: &GestureId);
    fn withdraw(&self, action: &str);
}

/// Revocation guard for one binding.
#[must_use = "dropping a Subscription revokes it immediately"]
pub struct Subscription {
    revoke: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(revoke: impl FnOnce() + Send + 'static) -> Self {
        Self {
            revoke: Some(Box::new(revoke)),
        }
    }

    /// Revoke now. Same as dropping.
    pub fn cancel(mut self) {
        self.revoke_now();
    }

    fn revoke_now(&mut self) {
        if let Some(revoke) = self.revoke.take() {
            revoke();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.revoke.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.revoke_now();
    }
}

// =============================================================================
// InputHub
// =============================================================================

struct Claim {
    id: u64,
    action: ActionName,
    touch_button: bool,
    handler: InputHandler,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    claims: HashMap<GestureId, Claim>,
    listeners: Vec<(u64, InputHandler)>,
}

impl HubInner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process input source. The host (or a test) feeds it events via
/// [`InputHub::emit`].
///
/// A claimed gesture is delivered to its owner first; passive listeners then
/// see the same event with `processed` set.
#[derive(Clone, Default)]
pub struct InputHub {
    inner: Arc<Mutex<HubInner>>,
}

impl fmt::Debug for InputHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputHub")
            .field("claims", &self.claim_count())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl InputHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one event. Returns how many handlers saw it.
    ///
    /// Handlers run outside the hub lock, so they may revoke their own
    /// subscription or emit further events.
    pub fn emit(&self, event: &InputEvent) -> usize {
        let (claim, listeners) = {
            let inner = self.inner.lock().expect("input hub mutex poisoned");
            let claim = inner
                .claims
                .get(&event.gesture)
                .map(|c| Arc::clone(&c.handler));
            let listeners: Vec<InputHandler> = inner
                .listeners
                .iter()
                .map(|(_, h)| Arc::clone(h))
                .collect();
            (claim, listeners)
        };

        let mut delivered = 0;
        let passive_event = match claim {
            Some(handler) => {
                handler(event);
                delivered += 1;
                event.clone().processed(true)
            }
            None => event.clone(),
        };
        for listener in &listeners {
            listener(&passive_event);
        }
        delivered + listeners.len()
    }

    /// Action currently holding `gesture`, if any.
    pub fn claimed_by(&self, gesture: &GestureId) -> Option<ActionName> {
        let inner = self.inner.lock().expect("input hub mutex poisoned");
        inner.claims.get(gesture).map(|c| c.action.clone())
    }

    /// Actions whose claim asked for an on-screen button.
    pub fn touch_buttons(&self) -> Vec<ActionName> {
        let inner = self.inner.lock().expect("input hub mutex poisoned");
        let mut actions: Vec<ActionName> = inner
            .claims
            .values()
            .filter(|c| c.touch_button)
            .map(|c| c.action.clone())
            .collect();
        actions.sort();
        actions
    }

    pub fn claim_count(&self) -> usize {
        self.inner.lock().expect("input hub mutex poisoned").claims.len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .expect("input hub mutex poisoned")
            .listeners
            .len()
    }

    fn revoker(&self) -> Weak<Mutex<HubInner>> {
        Arc::downgrade(&self.inner)
    }
}

impl InputSource for InputHub {
    fn bind_exclusive(
        &self,
        request: BindRequest,
        handler: InputHandler,
    ) -> Result<Subscription, RelayError> {
        let mut inner = self.inner.lock().expect("input hub mutex poisoned");
        if let Some(existing) = inner.claims.get(&request.gesture) {
            return Err(RelayError::GestureClaimed {
                gesture: request.gesture,
                owner: existing.action.to_string(),
            });
        }

        let id = inner.next_id();
        let gesture = request.gesture.clone();
        tracing::debug!(action = %request.action, gesture = %gesture, "Gesture claimed");
        inner.claims.insert(
            request.gesture,
            Claim {
                id,
                action: request.action,
                touch_button: request.touch_button,
                handler,
            },
        );

        let weak = self.revoker();
        Ok(Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().expect("input hub mutex poisoned");
                if inner.claims.get(&gesture).is_some_and(|c| c.id == id) {
                    inner.claims.remove(&gesture);
                    tracing::debug!(gesture = %gesture, "Gesture released");
                }
            }
        }))
    }

    fn listen(&self, handler: InputHandler) -> Subscription {
        let id = {
            let mut inner = self.inner.lock().expect("input hub mutex poisoned");
            let id = inner.next_id();
            inner.listeners.push((id, handler));
            id
        };

        let weak = self.revoker();
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.lock().expect("input hub mutex poisoned");
                inner.listeners.retain(|(lid, _)| *lid != id);
            }
        })
    }
}
