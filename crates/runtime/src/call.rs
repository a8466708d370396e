//! Call requests, contexts, and per-call outcomes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Unique identifier for one model turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnId(Uuid);

impl TurnId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A tool call requested by the model.
///
/// Produced by the call parser, consumed exactly once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Model-assigned identifier, unique within the turn. Correlates the
    /// outcome back to the call when folded into conversation state.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Raw, unvalidated arguments.
    pub args: Value,
}

/// Context handed to an executor alongside its validated arguments.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub call_id: String,
    pub tool_name: String,
    pub turn_id: TurnId,
    /// Cancellation signal for this call. Executors that ignore it run to
    /// completion; the dispatcher still awaits them.
    pub cancel: CancellationToken,
}

/// The resolved outcome of one call in a dispatch batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    /// The tool's executor ran and returned a value.
    Completed {
        call_id: String,
        tool_name: String,
        /// Validated arguments, defaults applied.
        args: Value,
        output: Value,
    },
    /// The tool has no bound executor; the caller must run it out-of-band.
    /// Not a failure.
    Forwarded {
        call_id: String,
        tool_name: String,
        args: Value,
    },
    /// The call failed. Failure is local to this call.
    Failed {
        call_id: String,
        tool_name: String,
        error: CallError,
    },
}

impl CallOutcome {
    pub fn call_id(&self) -> &str {
        match self {
            Self::Completed { call_id, .. }
            | Self::Forwarded { call_id, .. }
            | Self::Failed { call_id, .. } => call_id,
        }
    }

    pub fn tool_name(&self) -> &str {
        match self {
            Self::Completed { tool_name, .. }
            | Self::Forwarded { tool_name, .. }
            | Self::Failed { tool_name, .. } => tool_name,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Why a single call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum CallError {
    /// The requested tool is not in the registry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The arguments were rejected by the tool's schema.
    /// The executor was never invoked.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The executor returned an error, panicked, or timed out.
    #[error("execution failed: {0}")]
    Execution(String),

    /// The call envelope could not be parsed. Carries the raw block so the
    /// caller can surface it.
    #[error("malformed call envelope: {reason}")]
    MalformedCall { reason: String, raw: Value },
}
