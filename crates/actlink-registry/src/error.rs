//! Error types for action declaration and registration.

use actlink_core::error::ActlinkError;

/// Load-time configuration errors. All of them are fatal.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Action with name \"{0}\" already exists")]
    DuplicateAction(String),
    #[error("Action name must not be empty")]
    EmptyName,
    #[error("Action \"{0}\" has an empty gesture")]
    EmptyGesture(String),
    #[error("Action \"{action}\" is missing its {handler} handler")]
    MissingHandler {
        action: String,
        handler: &'static str,
    },
}

impl From<RegistryError> for ActlinkError {
    fn from(err: RegistryError) -> Self {
        ActlinkError::Registry(err.to_string())
    }
}
