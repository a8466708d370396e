//! Schema error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Schema errors.
///
/// Serializable so a validation failure can travel inside a per-call
/// outcome that is fed back to the model.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[non_exhaustive]
pub enum Error {
    /// The schema itself could not be compiled.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// The payload was rejected by the schema.
    #[error("arguments rejected: {0}")]
    Validation(String),

    /// The payload passed validation but could not be deserialized into
    /// the declared argument type.
    #[error("failed to deserialize arguments: {0}")]
    Deserialize(String),
}

pub type Result<T> = std::result::Result<T, Error>;
