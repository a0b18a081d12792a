pub mod config;
pub mod error;
pub mod types;

pub use config::ActlinkConfig;
pub use error::{ActlinkError, Result};
pub use types::*;
