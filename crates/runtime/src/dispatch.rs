//! Batch dispatch of parsed tool calls.

use crate::call::{CallContext, CallError, CallOutcome, TurnId};
use crate::config::DispatchConfig;
use crate::parse::ParsedCall;
use crate::registry::{ExecutorError, Handler, ToolRegistry};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Runs the calls of one batch and collects their outcomes.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: DispatchConfig,
}

/// A batch slot: either resolved up front or waiting on a spawned executor.
/// Indexed by input position so completion order never leaks into output
/// order.
enum Slot {
    Ready(CallOutcome),
    Running {
        call_id: String,
        tool_name: String,
        args: Value,
        handle: JoinHandle<std::result::Result<Value, ExecutorError>>,
    },
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    /// Dispatch a batch of parsed calls against the registry.
    ///
    /// Output length and order match the input. Each call resolves
    /// independently: unknown tools, rejected arguments, and executor
    /// failures become per-call [`CallOutcome::Failed`] entries and never
    /// abort their siblings. Bound executors run concurrently; the batch
    /// yields only when every call has an outcome.
    #[instrument(skip_all, fields(turn = %turn_id, calls = calls.len()))]
    pub async fn dispatch(
        &self,
        registry: &ToolRegistry,
        calls: Vec<ParsedCall>,
        turn_id: TurnId,
        cancel: &CancellationToken,
    ) -> Vec<CallOutcome> {
        let slots: Vec<Slot> = calls
            .into_iter()
            .map(|call| self.start_call(registry, call, turn_id, cancel))
            .collect();

        let mut outcomes = Vec::with_capacity(slots.len());
        for slot in slots {
            outcomes.push(match slot {
                Slot::Ready(outcome) => outcome,
                Slot::Running {
                    call_id,
                    tool_name,
                    args,
                    handle,
                } => Self::finish_call(call_id, tool_name, args, handle).await,
            });
        }
        outcomes
    }

    /// Resolve one call as far as possible without awaiting its executor.
    fn start_call(
        &self,
        registry: &ToolRegistry,
        call: ParsedCall,
        turn_id: TurnId,
        cancel: &CancellationToken,
    ) -> Slot {
        let request = match call {
            ParsedCall::Request(request) => request,
            ParsedCall::Malformed { raw, reason } => {
                warn!(reason = %reason, "malformed call envelope");
                let call_id = str_field(&raw, "id");
                let tool_name = str_field(&raw, "name");
                return Slot::Ready(CallOutcome::Failed {
                    call_id,
                    tool_name,
                    error: CallError::MalformedCall { reason, raw },
                });
            }
        };

        let Some(tool) = registry.lookup(&request.name) else {
            warn!(tool = %request.name, call_id = %request.id, "unknown tool");
            return Slot::Ready(CallOutcome::Failed {
                call_id: request.id,
                tool_name: request.name.clone(),
                error: CallError::UnknownTool(request.name),
            });
        };

        // The executor is never invoked with arguments the schema rejects.
        let args = match tool.schema().validate(&request.args) {
            Ok(args) => args,
            Err(e) => {
                warn!(tool = %request.name, call_id = %request.id, error = %e, "arguments rejected");
                return Slot::Ready(CallOutcome::Failed {
                    call_id: request.id,
                    tool_name: request.name,
                    error: CallError::InvalidArguments(e.to_string()),
                });
            }
        };

        match tool.handler() {
            Handler::Forwarding => Slot::Ready(CallOutcome::Forwarded {
                call_id: request.id,
                tool_name: request.name,
                args,
            }),
            Handler::Bound(executor) => {
                debug!(tool = %request.name, call_id = %request.id, "dispatching");
                let context = CallContext {
                    call_id: request.id.clone(),
                    tool_name: request.name.clone(),
                    turn_id,
                    cancel: cancel.child_token(),
                };
                // Invoked inside the task so a panic before the future
                // exists is still contained to this call's JoinHandle.
                let executor = executor.clone();
                let executor_args = args.clone();
                let timeout = self.config.timeout();
                let handle = tokio::spawn(async move {
                    let fut = executor.as_ref()(executor_args, context);
                    match timeout {
                        Some(limit) => match tokio::time::timeout(limit, fut).await {
                            Ok(result) => result,
                            Err(_) => {
                                Err(format!("timed out after {}ms", limit.as_millis()).into())
                            }
                        },
                        None => fut.await,
                    }
                });
                Slot::Running {
                    call_id: request.id,
                    tool_name: request.name,
                    args,
                    handle,
                }
            }
        }
    }

    async fn finish_call(
        call_id: String,
        tool_name: String,
        args: Value,
        handle: JoinHandle<std::result::Result<Value, ExecutorError>>,
    ) -> CallOutcome {
        match handle.await {
            Ok(Ok(output)) => CallOutcome::Completed {
                call_id,
                tool_name,
                args,
                output,
            },
            Ok(Err(e)) => {
                warn!(tool = %tool_name, call_id = %call_id, error = %e, "execution failed");
                CallOutcome::Failed {
                    call_id,
                    tool_name,
                    error: CallError::Execution(e.to_string()),
                }
            }
            // A panicking executor is contained to its own call.
            Err(join_error) => {
                warn!(tool = %tool_name, call_id = %call_id, "executor task failed: {join_error}");
                CallOutcome::Failed {
                    call_id,
                    tool_name,
                    error: CallError::Execution(format!("executor task failed: {join_error}")),
                }
            }
        }
    }
}

fn str_field(raw: &Value, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
