//! Error types for binding and relaying.

use actlink_core::error::ActlinkError;
use actlink_core::types::{GestureId, Role};

/// Configuration and caller-misuse errors. Raised at bind time and fatal.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("{operation} must be called from the {expected} role, not {actual}")]
    WrongRole {
        operation: &'static str,
        expected: Role,
        actual: Role,
    },
    #[error("No relay link available")]
    MissingChannel,
    #[error("Gesture {gesture} is already claimed by action \"{owner}\"")]
    GestureClaimed { gesture: GestureId, owner: String },
    #[error("Gesture binder is already bound")]
    AlreadyBound,
    #[error("Relay link \"{0}\" is closed")]
    ChannelClosed(String),
    #[error("Failed to encode relay message: {0}")]
    Encode(String),
}

/// Problems with an inbound message. Logged and dropped, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed relay message: {0}")]
    Malformed(String),
    #[error("unknown action \"{0}\"")]
    UnknownAction(String),
}

impl From<RelayError> for ActlinkError {
    fn from(err: RelayError) -> Self {
        ActlinkError::Relay(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_error_display() {
        let err = RelayError::WrongRole {
            operation: "GestureBinder::bind",
            expected: Role::Local,
            actual: Role::Remote,
        };
        assert_eq!(
            err.to_string(),
            "GestureBinder::bind must be called from the local role, not remote"
        );

        assert_eq!(RelayError::MissingChannel.to_string(), "No relay link available");

        let err = RelayError::GestureClaimed {
            gesture: GestureId::new("Space"),
            owner: "jump".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Gesture Space is already claimed by action \"jump\""
        );

        let err = RelayError::ChannelClosed("ActionLink".to_string());
        assert_eq!(err.to_string(), "Relay link \"ActionLink\" is closed");
    }

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::UnknownAction("nonexistent".to_string());
        assert_eq!(err.to_string(), "unknown action \"nonexistent\"");

        let err = ProtocolError::Malformed("missing field `ended`".to_string());
        assert_eq!(
            err.to_string(),
            "malformed relay message: missing field `ended`"
        );
    }

    #[test]
    fn test_relay_error_into_actlink_error() {
        let err: ActlinkError = RelayError::MissingChannel.into();
        assert!(matches!(err, ActlinkError::Relay(_)));
    }
}
