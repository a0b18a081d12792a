//! Remote-role dispatcher.
//!
//! Resolves every inbound frame against the registry and runs the remote
//! start or end handler. Protocol problems (bad payload, unknown action)
//! are logged and dropped; they never stop the receive loop.
//!
//! The dispatcher keeps no per-actor state. A duplicated start runs the
//! start handler twice, and an end with no prior start still runs the end
//! handler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use actlink_core::types::{ActionName, Actor, Role};
use actlink_registry::ActionRegistry;

use crate::channel::LinkReceiver;
use crate::error::{ProtocolError, RelayError};
use crate::message::{RelayFrame, RelayMessage};

/// What happened to one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The remote start handler ran.
    Started(ActionName),
    /// The remote end handler ran.
    Ended(ActionName),
    /// An end arrived for an action without a remote end handler.
    EndIgnored(ActionName),
    /// The frame was dropped.
    Dropped(ProtocolError),
}

/// Running totals, readable while the loop is running.
#[derive(Debug, Default)]
pub struct DispatchStats {
    started: AtomicU64,
    ended: AtomicU64,
    ignored: AtomicU64,
    dropped: AtomicU64,
}

/// Copy of [`DispatchStats`] at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub started: u64,
    pub ended: u64,
    pub ignored: u64,
    pub dropped: u64,
}

impl StatsSnapshot {
    pub fn total(&self) -> u64 {
        self.started + self.ended + self.ignored + self.dropped
    }
}

impl DispatchStats {
    fn record(&self, outcome: &DispatchOutcome) {
        let counter = match outcome {
            DispatchOutcome::Started(_) => &self.started,
            DispatchOutcome::Ended(_) => &self.ended,
            DispatchOutcome::EndIgnored(_) => &self.ignored,
            DispatchOutcome::Dropped(_) => &self.dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started: self.started.load(Ordering::Relaxed),
            ended: self.ended.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Runs remote handlers for relayed start/end messages.
#[derive(Debug)]
pub struct RemoteDispatcher {
    registry: Arc<ActionRegistry>,
    stats: DispatchStats,
}

impl RemoteDispatcher {
    /// Create a dispatcher. Only the remote role may do this.
    pub fn new(role: Role, registry: Arc<ActionRegistry>) -> Result<Self, RelayError> {
        if role != Role::Remote {
            return Err(RelayError::WrongRole {
                operation: "RemoteDispatcher::new",
                expected: Role::Remote,
                actual: role,
            });
        }
        Ok(Self {
            registry,
            stats: DispatchStats::default(),
        })
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Decode and dispatch one frame as delivered by the transport.
    pub fn dispatch(&self, frame: &RelayFrame) -> DispatchOutcome {
        let outcome = match RelayMessage::decode(&frame.payload) {
            Ok(message) => self.resolve_and_run(&frame.sender, &message),
            Err(e) => {
                tracing::warn!(sender = %frame.sender, error = %e, "Dropping relay frame");
                DispatchOutcome::Dropped(e)
            }
        };
        self.stats.record(&outcome);
        outcome
    }

    /// Dispatch an already decoded message.
    pub fn dispatch_message(&self, sender: &Actor, message: &RelayMessage) -> DispatchOutcome {
        let outcome = self.resolve_and_run(sender, message);
        self.stats.record(&outcome);
        outcome
    }

    /// Drain `inbox` until every sender is gone. Returns the number of
    /// frames processed.
    ///
    /// Takes the receiver by value, so a link can only ever have one
    /// dispatch loop.
    pub async fn run(&self, mut inbox: LinkReceiver) -> u64 {
        tracing::info!(link = %inbox.name(), actions = self.registry.len(), "Remote dispatcher started");
        let mut processed = 0u64;
        while let Some(frame) = inbox.recv().await {
            self.dispatch(&frame);
            processed += 1;
        }
        tracing::info!(link = %inbox.name(), processed, "Remote dispatcher stopped");
        processed
    }

    fn resolve_and_run(&self, sender: &Actor, message: &RelayMessage) -> DispatchOutcome {
        let Some(action) = self.registry.resolve(&message.action_name) else {
            let err = ProtocolError::UnknownAction(message.action_name.clone());
            tracing::warn!(sender = %sender, error = %err, "Dropping relay message");
            return DispatchOutcome::Dropped(err);
        };
        let key = action.canonical().clone();

        if !message.ended {
            tracing::debug!(action = %key, sender = %sender, "Remote start");
            action.remote_start(sender);
            DispatchOutcome::Started(key)
        } else if action.remote_end(sender) {
            tracing::debug!(action = %key, sender = %sender, "Remote end");
            DispatchOutcome::Ended(key)
        } else {
            DispatchOutcome::EndIgnored(key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{RelayChannel, RelayLink};
    use actlink_registry::ActionDescriptor;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    #[derive(Default)]
    struct Hits {
        start: AtomicUsize,
        end: AtomicUsize,
        last_actor: Mutex<Option<String>>,
    }

    fn registry(hits: &Arc<Hits>) -> Arc<ActionRegistry> {
        let s = Arc::clone(hits);
        let e = Arc::clone(hits);
        let block = ActionDescriptor::builder("Block", "F")
            .local_on_start(|_: &Actor| {})
            .remote_on_start(move |actor: &Actor| {
                s.start.fetch_add(1, Ordering::SeqCst);
                *s.last_actor.lock().unwrap() = Some(actor.name.clone());
            })
            .remote_on_end(move |_: &Actor| {
                e.end.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();
        let jump = ActionDescriptor::builder("Jump", "Space")
            .local_on_start(|_: &Actor| {})
            .remote_on_start(|_: &Actor| {})
            .build()
            .unwrap();
        Arc::new(ActionRegistry::from_descriptors(vec![block, jump]).unwrap())
    }

    fn frame(sender: &str, payload: &[u8]) -> RelayFrame {
        RelayFrame::new(Actor::new(sender), payload.to_vec())
    }

    #[test]
    fn test_new_from_local_role_fails() {
        let err = RemoteDispatcher::new(Role::Local, Arc::new(ActionRegistry::new())).unwrap_err();
        assert!(matches!(
            err,
            RelayError::WrongRole { expected: Role::Remote, actual: Role::Local, .. }
        ));
    }

    #[test]
    fn test_start_runs_remote_start_with_sender() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();

        let outcome = dispatcher.dispatch(&frame("alice", br#"{"actionName":"Block","ended":false}"#));
        assert_eq!(outcome, DispatchOutcome::Started(ActionName::new("block")));
        assert_eq!(hits.start.load(Ordering::SeqCst), 1);
        assert_eq!(hits.last_actor.lock().unwrap().as_deref(), Some("alice"));
    }

    #[test]
    fn test_name_is_canonicalized() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();
        let outcome = dispatcher.dispatch_message(&Actor::new("a"), &RelayMessage::start("bLoCk"));
        assert_eq!(outcome, DispatchOutcome::Started(ActionName::new("block")));
    }

    #[test]
    fn test_end_runs_remote_end() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();
        let outcome = dispatcher.dispatch_message(&Actor::new("a"), &RelayMessage::end("Block"));
        assert_eq!(outcome, DispatchOutcome::Ended(ActionName::new("block")));
        assert_eq!(hits.end.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_end_without_handler_is_silent_noop() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();
        let outcome = dispatcher.dispatch_message(&Actor::new("a"), &RelayMessage::end("Jump"));
        assert_eq!(outcome, DispatchOutcome::EndIgnored(ActionName::new("jump")));
        assert_eq!(dispatcher.stats().dropped, 0);
    }

    #[test]
    fn test_unknown_action_dropped() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();
        let outcome =
            dispatcher.dispatch_message(&Actor::new("a"), &RelayMessage::start("nonexistent"));
        assert_eq!(
            outcome,
            DispatchOutcome::Dropped(ProtocolError::UnknownAction("nonexistent".to_string()))
        );
    }

    // =====================================================================
    // Diagnostics
    // =====================================================================

    /// Records the message of every WARN-or-worse event.
    #[derive(Clone, Default)]
    struct WarnCapture(Arc<Mutex<Vec<String>>>);

    impl WarnCapture {
        fn messages(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct MessageVisitor(String);

    impl tracing::field::Visit for MessageVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for WarnCapture {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() <= tracing::Level::WARN {
                let mut visitor = MessageVisitor(String::new());
                event.record(&mut visitor);
                self.0.lock().unwrap().push(visitor.0);
            }
        }
    }

    fn capture_warnings(f: impl FnOnce()) -> Vec<String> {
        let capture = WarnCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        tracing::subscriber::with_default(subscriber, f);
        capture.messages()
    }

    #[test]
    fn test_unknown_action_emits_warning() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();
        let warnings = capture_warnings(|| {
            dispatcher.dispatch_message(&Actor::new("a"), &RelayMessage::start("nonexistent"));
        });
        assert_eq!(warnings, vec!["Dropping relay message".to_string()]);
    }

    #[test]
    fn test_malformed_frame_emits_warning() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();
        let warnings = capture_warnings(|| {
            dispatcher.dispatch(&frame("mallory", br#"{"actionName":"Block"}"#));
        });
        assert_eq!(warnings, vec!["Dropping relay frame".to_string()]);
    }

    #[test]
    fn test_end_without_handler_emits_no_warning() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();
        let warnings = capture_warnings(|| {
            dispatcher.dispatch_message(&Actor::new("a"), &RelayMessage::start("Jump"));
            dispatcher.dispatch_message(&Actor::new("a"), &RelayMessage::end("Jump"));
        });
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_malformed_payloads_dropped() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();

        for payload in [
            &br#"{"actionName":7,"ended":false}"#[..],
            &br#"{"actionName":"Block","ended":"no"}"#[..],
            &br#"{"actionName":"Block"}"#[..],
            &b"\xff\xfe"[..],
        ] {
            let outcome = dispatcher.dispatch(&frame("mallory", payload));
            assert!(matches!(outcome, DispatchOutcome::Dropped(ProtocolError::Malformed(_))));
        }
        assert_eq!(hits.start.load(Ordering::SeqCst), 0);
        assert_eq!(dispatcher.stats().dropped, 4);
    }

    #[test]
    fn test_end_while_idle_still_runs_handler() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();
        dispatcher.dispatch_message(&Actor::new("a"), &RelayMessage::end("Block"));
        dispatcher.dispatch_message(&Actor::new("a"), &RelayMessage::end("Block"));
        assert_eq!(hits.end.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_duplicate_start_runs_twice() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();
        let start = RelayMessage::start("Block");
        dispatcher.dispatch_message(&Actor::new("a"), &start);
        dispatcher.dispatch_message(&Actor::new("a"), &start);
        assert_eq!(hits.start.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stats_snapshot() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();
        let a = Actor::new("a");
        dispatcher.dispatch_message(&a, &RelayMessage::start("Block"));
        dispatcher.dispatch_message(&a, &RelayMessage::end("Block"));
        dispatcher.dispatch_message(&a, &RelayMessage::end("Jump"));
        dispatcher.dispatch_message(&a, &RelayMessage::start("ghost"));

        let stats = dispatcher.stats();
        assert_eq!(
            stats,
            StatsSnapshot {
                started: 1,
                ended: 1,
                ignored: 1,
                dropped: 1,
            }
        );
        assert_eq!(stats.total(), 4);
    }

    #[tokio::test]
    async fn test_run_survives_bad_frames() {
        let hits = Arc::new(Hits::default());
        let dispatcher = RemoteDispatcher::new(Role::Remote, registry(&hits)).unwrap();
        let (link, rx) = RelayLink::new("ActionLink");
        let sender = link.connect(Actor::new("alice"));

        sender.send_raw(b"{}".to_vec()).unwrap();
        sender.send(&RelayMessage::start("nonexistent")).unwrap();
        sender.send(&RelayMessage::start("Block")).unwrap();
        drop(sender);
        drop(link);

        let processed = dispatcher.run(rx).await;
        assert_eq!(processed, 3);
        assert_eq!(hits.start.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.stats().dropped, 2);
    }
}
