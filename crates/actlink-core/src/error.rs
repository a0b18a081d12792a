use thiserror::Error;

/// Top-level error type for actlink.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for ActlinkError` so that `?` works across crate
/// boundaries in the binary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActlinkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Relay error: {0}")]
    Relay(String),

    #[error("Script error on line {line}: {reason}")]
    Script { line: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ActlinkError {
    fn from(err: toml::de::Error) -> Self {
        ActlinkError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ActlinkError {
    fn from(err: toml::ser::Error) -> Self {
        ActlinkError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ActlinkError {
    fn from(err: serde_json::Error) -> Self {
        ActlinkError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for actlink operations.
pub type Result<T> = std::result::Result<T, ActlinkError>;
