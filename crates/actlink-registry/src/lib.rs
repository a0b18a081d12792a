//! Action registry for actlink.
//!
//! Holds the declared actions in a name-keyed table, rejects duplicate
//! names at load time, and indexes passive-listener actions by gesture.

pub mod descriptor;
pub mod error;
pub mod gesture_table;
pub mod registry;

pub use descriptor::{ActionCallback, ActionDescriptor, DescriptorBuilder};
pub use error::RegistryError;
pub use gesture_table::GestureTable;
pub use registry::ActionRegistry;
