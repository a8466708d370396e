//! Policy error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Policy errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A forced tool choice names a tool that is not registered.
    /// Raised at configuration time, before any model call.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The model's response did not honor the tool-choice contract.
    #[error(transparent)]
    Violation(#[from] Violation),
}

/// A broken tool-choice contract.
///
/// Distinct from any per-call dispatch error: a violation means the
/// upstream model misbehaved, not that a tool failed. A violation rejects
/// the whole batch before any executor runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum Violation {
    /// Tool calls were requested under a `none` choice.
    #[error("tool calls are not permitted this turn ({count} requested)")]
    CallsNotAllowed { count: usize },

    /// No tool call was requested under a `required` or `forced` choice.
    #[error("at least one tool call is required")]
    NoCalls,

    /// A different tool was called than the one forced.
    #[error("expected a call to `{expected}`, model called `{actual}`")]
    WrongTool { expected: String, actual: String },

    /// More than one call was made under a `forced` choice.
    #[error("expected exactly one call to `{expected}`, got {count}")]
    ExtraCalls { expected: String, count: usize },

    /// The same tool was called more than once in a turn that forbids it.
    #[error("tool `{name}` called {count} times in one turn")]
    RepeatedTool { name: String, count: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
