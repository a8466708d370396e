//! Per-turn state machine: manifest out, outcomes back.

use crate::call::{CallOutcome, TurnId};
use crate::config::{DispatchConfig, DuplicateCalls};
use crate::dispatch::Dispatcher;
use crate::parse::{ParsedCall, parse_response};
use crate::registry::{ToolManifestEntry, ToolRegistry};
use crate::{Error, Result};
use policy::{Directive, ToolChoice, Violation};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Where a turn is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingModelResponse,
    Parsed,
    PolicyChecked,
    Dispatching,
    /// All calls resolved or forwarded.
    Completed,
    /// Tool-choice contract broken; dispatch never started.
    Rejected,
}

/// The boundary artifact sent to the model: every registered tool plus the
/// tool-choice directive.
#[derive(Debug, Clone, Serialize)]
pub struct ModelTurnRequest {
    pub tools: Vec<ToolManifestEntry>,
    pub tool_choice: Directive,
}

/// One conversation turn against a read-only registry.
///
/// Created before the model call (preflight runs here, so a forced choice
/// naming an unregistered tool fails at configuration time), resolved at
/// most once when the model's response arrives.
#[derive(Debug)]
pub struct Turn<'a> {
    registry: &'a ToolRegistry,
    choice: ToolChoice,
    config: DispatchConfig,
    directive: Directive,
    id: TurnId,
    state: TurnState,
    cancel: CancellationToken,
}

impl<'a> Turn<'a> {
    pub fn new(registry: &'a ToolRegistry, choice: ToolChoice, config: DispatchConfig) -> Result<Self> {
        let names = registry.names();
        let directive = choice.directive(&names)?;
        Ok(Self {
            registry,
            choice,
            config,
            directive,
            id: TurnId::new(),
            state: TurnState::AwaitingModelResponse,
            cancel: CancellationToken::new(),
        })
    }

    pub fn id(&self) -> TurnId {
        self.id
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Token offered to every executor of this turn. Cancelling it signals
    /// in-flight calls; non-cooperating executors run to completion and the
    /// caller discards their results.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The manifest request for the model-facing layer.
    pub fn request(&self) -> ModelTurnRequest {
        ModelTurnRequest {
            tools: self.registry.manifest(),
            tool_choice: self.directive.clone(),
        }
    }

    /// Drive the turn from a raw model response to resolved outcomes.
    ///
    /// Parses the call envelopes, checks tool-choice compliance, then
    /// dispatches. A policy violation rejects the whole batch before any
    /// executor is invoked. Outcome order mirrors the model's emission
    /// order.
    #[instrument(skip_all, fields(turn = %self.id))]
    pub async fn resolve(&mut self, response: &Value) -> Result<Vec<CallOutcome>> {
        if self.state != TurnState::AwaitingModelResponse {
            return Err(Error::InvalidState(format!(
                "turn already driven to {:?}",
                self.state
            )));
        }

        let parsed = parse_response(response);
        self.state = TurnState::Parsed;
        debug!(calls = parsed.len(), "parsed model response");

        let called: Vec<&str> = parsed
            .iter()
            .filter_map(ParsedCall::as_request)
            .map(|request| request.name.as_str())
            .collect();

        if let Err(violation) = self.choice.check_compliance(&called) {
            self.state = TurnState::Rejected;
            return Err(policy::Error::from(violation).into());
        }
        if self.config.duplicate_calls == DuplicateCalls::Reject {
            if let Some((name, count)) = repeated_tool(&called) {
                self.state = TurnState::Rejected;
                return Err(policy::Error::from(Violation::RepeatedTool { name, count }).into());
            }
        }
        self.state = TurnState::PolicyChecked;

        self.state = TurnState::Dispatching;
        let dispatcher = Dispatcher::new(self.config.clone());
        let outcomes = dispatcher
            .dispatch(self.registry, parsed, self.id, &self.cancel)
            .await;
        self.state = TurnState::Completed;
        Ok(outcomes)
    }
}

fn repeated_tool(called: &[&str]) -> Option<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in called {
        *counts.entry(name).or_default() += 1;
    }
    counts
        .into_iter()
        .find(|(_, count)| *count > 1)
        .map(|(name, count)| (name.to_string(), count))
}
