//! Runtime error types.

use thiserror::Error;

/// Turn-level errors.
///
/// Per-call failures are not errors at this level: they are folded into the
/// outcome sequence as [`crate::CallError`] values. An `Error` here means
/// the turn itself could not proceed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A tool with this name is already registered.
    /// Fatal at registry construction time.
    #[error("duplicate tool name: {0}")]
    DuplicateToolName(String),

    /// The turn was driven out of order (e.g. resolved twice).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Configuration could not be loaded or parsed.
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Schema(#[from] schema::Error),

    #[error(transparent)]
    Policy(#[from] policy::Error),
}

impl Error {
    /// The tool-choice violation behind this error, if that is what it is.
    ///
    /// Violations are a distinct class from dispatch failures: the model
    /// broke the tool-choice contract and the batch was rejected whole.
    pub fn violation(&self) -> Option<&policy::Violation> {
        match self {
            Self::Policy(policy::Error::Violation(v)) => Some(v),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
