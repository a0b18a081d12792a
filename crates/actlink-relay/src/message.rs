//! Relay wire format.
//!
//! A message is a JSON object with exactly two required fields:
//! `{"actionName": "<sender casing>", "ended": <bool>}`. Field order does
//! not matter and unknown extra fields are ignored. Payloads are parsed once
//! at the boundary; everything past [`RelayMessage::decode`] works on the
//! typed value.

use serde::{Deserialize, Serialize};

use actlink_core::types::{ActionName, Actor};

use crate::error::{ProtocolError, RelayError};

/// Start or end of one action, as sent over the link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayMessage {
    pub action_name: String,
    pub ended: bool,
}

impl RelayMessage {
    pub fn start(action_name: impl Into<String>) -> Self {
        Self {
            action_name: action_name.into(),
            ended: false,
        }
    }

    pub fn end(action_name: impl Into<String>) -> Self {
        Self {
            action_name: action_name.into(),
            ended: true,
        }
    }

    /// The lowercased name the receiver resolves against.
    pub fn canonical_name(&self) -> ActionName {
        ActionName::new(&self.action_name)
    }

    pub fn encode(&self) -> Result<Vec<u8>, RelayError> {
        serde_json::to_vec(self).map_err(|e| RelayError::Encode(e.to_string()))
    }

    /// Parse and shape-check an inbound payload.
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(payload).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

/// A payload as delivered by the transport, tagged with its sender.
///
/// The sender comes from the transport, never from the payload.
#[derive(Debug, Clone)]
pub struct RelayFrame {
    pub sender: Actor,
    pub payload: Vec<u8>,
}

impl RelayFrame {
    pub fn new(sender: Actor, payload: Vec<u8>) -> Self {
        Self { sender, payload }
    }
}
