//! Argument schema descriptors.
//!
//! Core principle: **All argument payloads from the model cross a validation
//! boundary before any downstream code sees them.** An [`ArgumentSchema`]
//! pairs a JSON Schema description (sent to the model inside the tool
//! manifest) with a compiled validator that turns untrusted payloads into
//! canonical, typed values.

mod descriptor;
mod error;

pub use descriptor::ArgumentSchema;
pub use error::{Error, Result};
