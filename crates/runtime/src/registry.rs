//! Tool definitions and the registry.

use crate::call::CallContext;
use crate::{Error, Result};
use schema::ArgumentSchema;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Error type executors may return. Captured per call as an execution
/// failure; it never propagates past the dispatcher.
pub type ExecutorError = Box<dyn std::error::Error + Send + Sync>;

pub type ExecutorFuture =
    Pin<Box<dyn Future<Output = std::result::Result<Value, ExecutorError>> + Send>>;

/// An executor bound to a tool. Receives validated arguments and the call
/// context, returns the tool's output value.
pub type Executor = Arc<dyn Fn(Value, CallContext) -> ExecutorFuture + Send + Sync>;

/// How calls to a tool are handled.
///
/// Forwarding is an explicit variant rather than an absent executor: a
/// forwarding tool's calls are surfaced to the caller for out-of-band
/// execution, which is a distinct, non-failure outcome.
#[derive(Clone)]
pub enum Handler {
    /// Calls run through this executor in-process.
    Bound(Executor),
    /// Calls are validated, then handed back to the caller.
    Forwarding,
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bound(_) => f.write_str("Bound(..)"),
            Self::Forwarding => f.write_str("Forwarding"),
        }
    }
}

/// A named, schema-described capability the model may invoke.
///
/// Immutable after registration.
#[derive(Debug)]
pub struct ToolDefinition {
    name: String,
    description: Option<String>,
    schema: ArgumentSchema,
    handler: Handler,
}

impl ToolDefinition {
    /// A tool whose calls are forwarded to the caller after validation.
    pub fn forwarding(name: impl Into<String>, schema: ArgumentSchema) -> Self {
        Self {
            name: name.into(),
            description: None,
            schema,
            handler: Handler::Forwarding,
        }
    }

    /// A tool bound to an executor taking raw (but validated) JSON args.
    pub fn bound<F, Fut>(name: impl Into<String>, schema: ArgumentSchema, executor: F) -> Self
    where
        F: Fn(Value, CallContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Value, ExecutorError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            schema,
            handler: Handler::Bound(Arc::new(move |args, ctx| {
                Box::pin(executor(args, ctx)) as ExecutorFuture
            })),
        }
    }

    /// A tool whose schema is derived from its argument type and whose
    /// executor receives fully typed arguments.
    pub fn typed<T, F, Fut>(name: impl Into<String>, executor: F) -> Result<Self>
    where
        T: JsonSchema + DeserializeOwned + Send + 'static,
        F: Fn(T, CallContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<Value, ExecutorError>> + Send + 'static,
    {
        let schema = ArgumentSchema::of::<T>()?;
        let handler = Handler::Bound(Arc::new(move |args: Value, ctx: CallContext| {
            match serde_json::from_value::<T>(args) {
                Ok(typed) => Box::pin(executor(typed, ctx)) as ExecutorFuture,
                Err(e) => {
                    let err: ExecutorError = e.to_string().into();
                    Box::pin(async move { Err::<Value, _>(err) }) as ExecutorFuture
                }
            }
        }));
        Ok(Self {
            name: name.into(),
            description: None,
            schema,
            handler,
        })
    }

    /// Attach a human-readable description for the manifest.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &ArgumentSchema {
        &self.schema
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }
}

/// One tool's entry in the model-facing manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolManifestEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Mapping from tool name to definition.
///
/// Constructed once per conversation configuration and read-only during
/// dispatch; registration happens between turns under exclusive access,
/// which the `&mut self`/`&self` split enforces.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool definition.
    ///
    /// Fails with [`Error::DuplicateToolName`] if the name is taken; the
    /// registry is unchanged on failure.
    pub fn register(&mut self, definition: ToolDefinition) -> Result<()> {
        if self.tools.contains_key(definition.name()) {
            return Err(Error::DuplicateToolName(definition.name().to_string()));
        }
        self.tools
            .insert(definition.name().to_string(), definition);
        Ok(())
    }

    /// Look up a tool by name. Pure; no side effects.
    pub fn lookup(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The manifest describing every registered tool to the model.
    pub fn manifest(&self) -> Vec<ToolManifestEntry> {
        self.tools
            .values()
            .map(|tool| ToolManifestEntry {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.schema.describe().clone(),
            })
            .collect()
    }
}
