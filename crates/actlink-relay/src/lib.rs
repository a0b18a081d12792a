//! Gesture binding and start/end relay for actlink.
//!
//! The local role binds registered actions to an input source, runs the
//! local handlers and sends a two-field message over the relay link. The
//! remote role receives those messages, resolves them against the same
//! registry and runs the remote handlers.

pub mod binder;
pub mod channel;
pub mod dispatcher;
pub mod error;
pub mod input;
pub mod message;
pub mod pairing;

pub use binder::GestureBinder;
pub use channel::{LinkReceiver, LinkSender, RelayChannel, RelayLink};
pub use dispatcher::{DispatchOutcome, DispatchStats, RemoteDispatcher, StatsSnapshot};
pub use error::{ProtocolError, RelayError};
pub use input::{
    BindRequest, InputEvent, InputHandler, InputHub, InputSource, Subscription, TouchAffordance,
};
pub use message::{RelayFrame, RelayMessage};
pub use pairing::{PressState, PressTracker};
