use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Which side of the relay a process plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The side where gestures are physically observed.
    #[default]
    Local,
    /// The side that reacts to relayed start/end events.
    Remote,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Local => write!(f, "local"),
            Role::Remote => write!(f, "remote"),
        }
    }
}

/// How an action's gesture is attached to the input source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMethod {
    /// Exclusive claim on the gesture. Only one action per gesture.
    #[default]
    DirectBind,
    /// Passive listener on the shared raw input stream.
    RawListen,
}

impl fmt::Display for InputMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMethod::DirectBind => write!(f, "direct_bind"),
            InputMethod::RawListen => write!(f, "raw_listen"),
        }
    }
}

/// Phase of a raw input transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputPhase {
    /// The gesture went down.
    Begin,
    /// The gesture is held and its value moved (analog input). Never dispatched.
    Change,
    /// The gesture was released.
    End,
    /// The input source withdrew the gesture (focus loss, rebinding).
    Cancel,
}

impl fmt::Display for InputPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputPhase::Begin => write!(f, "begin"),
            InputPhase::Change => write!(f, "change"),
            InputPhase::End => write!(f, "end"),
            InputPhase::Cancel => write!(f, "cancel"),
        }
    }
}

// =============================================================================
// Newtype Wrappers
// =============================================================================

/// Canonical (lowercased) action name used as the registry key.
///
/// Two names that differ only by case produce the same `ActionName`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionName(String);

impl ActionName {
    /// Canonicalize a raw action name.
    pub fn new(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ActionName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Opaque identifier of a triggering input (key, button, input type).
///
/// Compared exactly; the input source decides what the string means.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GestureId(pub String);

impl GestureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for GestureId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for GestureId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The entity on whose behalf an action fires (a connected player or user).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.name)
    }
}

// =============================================================================
// Tests
// =============================================================================
