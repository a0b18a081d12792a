//! Declared shape of one action.
//!
//! A descriptor is built once through [`DescriptorBuilder`], which validates
//! the name, the gesture and the presence of both start handlers. After that
//! it is immutable and shared behind an `Arc`.

use std::fmt;
use std::sync::Arc;

use actlink_core::types::{ActionName, Actor, GestureId, InputMethod};

use crate::error::RegistryError;

/// Lifecycle handler invoked with the actor the event belongs to.
pub type ActionCallback = Arc<dyn Fn(&Actor) + Send + Sync>;

/// One registered action: a name, a gesture, and four lifecycle handlers.
#[derive(Clone)]
pub struct ActionDescriptor {
    name: String,
    canonical: ActionName,
    gesture: GestureId,
    local_on_start: ActionCallback,
    local_on_end: Option<ActionCallback>,
    remote_on_start: ActionCallback,
    remote_on_end: Option<ActionCallback>,
    input_method: InputMethod,
    touch_affordance: bool,
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("name", &self.name)
            .field("gesture", &self.gesture)
            .field("input_method", &self.input_method)
            .field("touch_affordance", &self.touch_affordance)
            .field("has_local_end", &self.local_on_end.is_some())
            .field("has_remote_end", &self.remote_on_end.is_some())
            .finish()
    }
}

impl ActionDescriptor {
    /// Start building a descriptor for `name` bound to `gesture`.
    pub fn builder(name: impl Into<String>, gesture: impl Into<GestureId>) -> DescriptorBuilder {
        DescriptorBuilder {
            name: name.into(),
            gesture: gesture.into(),
            local_on_start: None,
            local_on_end: None,
            remote_on_start: None,
            remote_on_end: None,
            input_method: InputMethod::default(),
            touch_affordance: false,
        }
    }

    /// Name as declared. This casing is what goes on the wire.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased registry key.
    pub fn canonical(&self) -> &ActionName {
        &self.canonical
    }

    pub fn gesture(&self) -> &GestureId {
        &self.gesture
    }

    pub fn input_method(&self) -> InputMethod {
        self.input_method
    }

    pub fn touch_affordance(&self) -> bool {
        self.touch_affordance
    }

    pub fn has_local_end(&self) -> bool {
        self.local_on_end.is_some()
    }

    pub fn has_remote_end(&self) -> bool {
        self.remote_on_end.is_some()
    }

    pub fn local_start(&self, actor: &Actor) {
        (self.local_on_start)(actor);
    }

    /// Runs the local end handler. Returns `false` when none is declared.
    pub fn local_end(&self, actor: &Actor) -> bool {
        match &self.local_on_end {
            Some(handler) => {
                handler(actor);
                true
            }
            None => false,
        }
    }

    pub fn remote_start(&self, actor: &Actor) {
        (self.remote_on_start)(actor);
    }

    /// Runs the remote end handler. Returns `false` when none is declared.
    pub fn remote_end(&self, actor: &Actor) -> bool {
        match &self.remote_on_end {
            Some(handler) => {
                handler(actor);
                true
            }
            None => false,
        }
    }
}

/// Builder for [`ActionDescriptor`].
pub struct DescriptorBuilder {
    name: String,
    gesture: GestureId,
    local_on_start: Option<ActionCallback>,
    local_on_end: Option<ActionCallback>,
    remote_on_start: Option<ActionCallback>,
    remote_on_end: Option<ActionCallback>,
    input_method: InputMethod,
    touch_affordance: bool,
}

impl DescriptorBuilder {
    pub fn local_on_start(mut self, f: impl Fn(&Actor) + Send + Sync + 'static) -> Self {
        self.local_on_start = Some(Arc::new(f));
        self
    }

    pub fn local_on_end(mut self, f: impl Fn(&Actor) + Send + Sync + 'static) -> Self {
        self.local_on_end = Some(Arc::new(f));
        self
    }

    pub fn remote_on_start(mut self, f: impl Fn(&Actor) + Send + Sync + 'static) -> Self {
        self.remote_on_start = Some(Arc::new(f));
        self
    }

    pub fn remote_on_end(mut self, f: impl Fn(&Actor) + Send + Sync + 'static) -> Self {
        self.remote_on_end = Some(Arc::new(f));
        self
    }

    pub fn input_method(mut self, method: InputMethod) -> Self {
        self.input_method = method;
        self
    }

    pub fn touch_affordance(mut self, enabled: bool) -> Self {
        self.touch_affordance = enabled;
        self
    }

    /// Validate and produce the descriptor.
    ///
    /// Fails when the name or gesture is blank, or when either start
    /// handler is missing. End handlers are optional.
    pub fn build(self) -> Result<ActionDescriptor, RegistryError> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.gesture.as_str().trim().is_empty() {
            return Err(RegistryError::EmptyGesture(self.name));
        }
        let local_on_start = self.local_on_start.ok_or_else(|| RegistryError::MissingHandler {
            action: self.name.clone(),
            handler: "local start",
        })?;
        let remote_on_start = self
            .remote_on_start
            .ok_or_else(|| RegistryError::MissingHandler {
                action: self.name.clone(),
                handler: "remote start",
            })?;

        Ok(ActionDescriptor {
            canonical: ActionName::new(&self.name),
            name: self.name,
            gesture: self.gesture,
            local_on_start,
            local_on_end: self.local_on_end,
            remote_on_start,
            remote_on_end: self.remote_on_end,
            input_method: self.input_method,
            touch_affordance: self.touch_affordance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn noop(_: &Actor) {}

    #[test]
    fn test_build_minimal_descriptor() {
        let d = ActionDescriptor::builder("Jump", "Space")
            .local_on_start(noop)
            .remote_on_start(noop)
            .build()
            .unwrap();

        assert_eq!(d.name(), "Jump");
        assert_eq!(d.canonical().as_str(), "jump");
        assert_eq!(d.gesture(), &GestureId::new("Space"));
        assert_eq!(d.input_method(), InputMethod::DirectBind);
        assert!(!d.touch_affordance());
        assert!(!d.has_local_end());
        assert!(!d.has_remote_end());
    }

    #[test]
    fn test_build_full_descriptor() {
        let d = ActionDescriptor::builder("Block", "F")
            .local_on_start(noop)
            .local_on_end(noop)
            .remote_on_start(noop)
            .remote_on_end(noop)
            .input_method(InputMethod::RawListen)
            .touch_affordance(true)
            .build()
            .unwrap();

        assert_eq!(d.input_method(), InputMethod::RawListen);
        assert!(d.touch_affordance());
        assert!(d.has_local_end());
        assert!(d.has_remote_end());
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = ActionDescriptor::builder("  ", "Space")
            .local_on_start(noop)
            .remote_on_start(noop)
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::EmptyName);
    }

    #[test]
    fn test_empty_gesture_rejected() {
        let err = ActionDescriptor::builder("Jump", "")
            .local_on_start(noop)
            .remote_on_start(noop)
            .build()
            .unwrap_err();
        assert_eq!(err, RegistryError::EmptyGesture("Jump".to_string()));
    }

    #[test]
    fn test_missing_start_handlers_rejected() {
        let err = ActionDescriptor::builder("Jump", "Space")
            .remote_on_start(noop)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingHandler { handler: "local start", .. }
        ));

        let err = ActionDescriptor::builder("Jump", "Space")
            .local_on_start(noop)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::MissingHandler { handler: "remote start", .. }
        ));
    }

    #[test]
    fn test_handlers_receive_actor() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let d = ActionDescriptor::builder("Jump", "Space")
            .local_on_start(noop)
            .remote_on_start(move |actor: &Actor| {
                assert_eq!(actor.name, "alice");
                h.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        d.remote_start(&Actor::new("alice"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_end_handlers_report_false() {
        let d = ActionDescriptor::builder("Jump", "Space")
            .local_on_start(noop)
            .remote_on_start(noop)
            .build()
            .unwrap();
        let actor = Actor::new("bob");
        assert!(!d.local_end(&actor));
        assert!(!d.remote_end(&actor));
    }

    #[test]
    fn test_debug_omits_callbacks() {
        let d = ActionDescriptor::builder("Jump", "Space")
            .local_on_start(noop)
            .remote_on_start(noop)
            .build()
            .unwrap();
        let dbg = format!("{:?}", d);
        assert!(dbg.contains("Jump"));
        assert!(dbg.contains("has_local_end: false"));
    }
}
