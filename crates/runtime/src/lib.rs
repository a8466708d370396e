//! Capstan runtime: tool-call orchestration for model-driven conversations.
//!
//! This crate provides the core loop around a single model turn: describing
//! registered tools to the model, parsing the call requests it returns,
//! validating their arguments, and dispatching execution with per-call
//! failure isolation.
//!
//! # Overview
//!
//! The runtime is organized around these concepts:
//!
//! - **ToolRegistry**: A read-only mapping from tool name to definition
//!   (description, argument schema, and an optional executor).
//! - **Turn**: The per-turn state machine. Produces the model-facing
//!   manifest plus tool-choice directive, then resolves the model's
//!   response into ordered call outcomes.
//! - **Dispatcher**: Runs the calls of one batch concurrently, collecting
//!   results back into request order. One call's failure never aborts its
//!   siblings.
//!
//! # Example
//!
//! ```ignore
//! use policy::ToolChoice;
//! use runtime::{DispatchConfig, ToolDefinition, ToolRegistry, Turn};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct WeatherArgs {
//!     location: String,
//! }
//!
//! # async fn example() -> runtime::Result<()> {
//! let mut registry = ToolRegistry::new();
//! registry.register(
//!     ToolDefinition::typed::<WeatherArgs, _, _>("weather", |args, _ctx| async move {
//!         Ok(json!({ "location": args.location, "temperature": 72 }))
//!     })?
//!     .description("Look up current weather for a location"),
//! )?;
//!
//! let mut turn = Turn::new(&registry, ToolChoice::Auto, DispatchConfig::default())?;
//! let request = turn.request(); // send manifest + directive to the model
//! # let response = json!({});
//! let outcomes = turn.resolve(&response).await?; // fold back into the conversation
//! # Ok(())
//! # }
//! ```

mod call;
mod config;
mod dispatch;
mod error;
mod parse;
mod registry;
mod turn;

// Call requests and per-call outcomes
pub use call::{CallContext, CallError, CallOutcome, ToolCallRequest, TurnId};

// Dispatch configuration
pub use config::{DispatchConfig, DuplicateCalls};

// Batch dispatcher
pub use dispatch::Dispatcher;

// Error types
pub use error::{Error, Result};

// Model response parsing
pub use parse::{ParsedCall, parse_response};

// Tool registry
pub use registry::{
    Executor, ExecutorError, ExecutorFuture, Handler, ToolDefinition, ToolManifestEntry,
    ToolRegistry,
};

// Turn state machine
pub use turn::{ModelTurnRequest, Turn, TurnState};
