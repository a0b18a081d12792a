//! Relay link between the local and remote roles.
//!
//! [`RelayChannel`] is the contract the binder sends through. [`RelayLink`]
//! is the in-process implementation: one shared link, one unbounded ordered
//! queue, and a [`LinkSender`] per connected actor so the receiving side
//! learns who sent each frame from the transport itself.

use std::sync::Arc;

use tokio::sync::mpsc;

use actlink_core::types::Actor;

use crate::error::RelayError;
use crate::message::{RelayFrame, RelayMessage};

/// Outbound half of the relay, as seen by the local role.
pub trait RelayChannel: Send + Sync {
    /// Link name, for diagnostics.
    fn name(&self) -> &str;

    /// Queue one message. Never blocks.
    fn send(&self, message: &RelayMessage) -> Result<(), RelayError>;
}

/// The shared link. Owned by the host; both roles hold handles to it.
#[derive(Debug, Clone)]
pub struct RelayLink {
    name: Arc<str>,
    tx: mpsc::UnboundedSender<RelayFrame>,
}

impl RelayLink {
    /// Create the link and its single receiving end.
    pub fn new(name: &str) -> (Self, LinkReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let name: Arc<str> = Arc::from(name);
        tracing::debug!(link = %name, "Relay link created");
        (
            Self {
                name: Arc::clone(&name),
                tx,
            },
            LinkReceiver { name, rx },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A sending handle that stamps every frame with `actor`.
    pub fn connect(&self, actor: Actor) -> LinkSender {
        tracing::debug!(link = %self.name, actor = %actor, "Actor connected to relay link");
        LinkSender {
            name: Arc::clone(&self.name),
            actor,
            tx: self.tx.clone(),
        }
    }
}

/// Per-actor sending handle.
#[derive(Debug, Clone)]
pub struct LinkSender {
    name: Arc<str>,
    actor: Actor,
    tx: mpsc::UnboundedSender<RelayFrame>,
}

impl LinkSender {
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Send an arbitrary payload, bypassing the encoder.
    ///
    /// The receiving side sees exactly these bytes, as it would from a
    /// misbehaving peer.
    pub fn send_raw(&self, payload: Vec<u8>) -> Result<(), RelayError> {
        self.tx
            .send(RelayFrame::new(self.actor.clone(), payload))
            .map_err(|_| RelayError::ChannelClosed(self.name.to_string()))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl RelayChannel for LinkSender {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, message: &RelayMessage) -> Result<(), RelayError> {
        self.send_raw(message.encode()?)
    }
}

/// Receiving end of the link. There is exactly one per link.
#[derive(Debug)]
pub struct LinkReceiver {
    name: Arc<str>,
    rx: mpsc::UnboundedReceiver<RelayFrame>,
}

impl LinkReceiver {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the next frame. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<RelayFrame> {
        self.rx.recv().await
    }

    /// Take the next frame if one is already queued.
    pub fn try_recv(&mut self) -> Option<RelayFrame> {
        self.rx.try_recv().ok()
    }

    /// Stop accepting frames. Queued frames can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
