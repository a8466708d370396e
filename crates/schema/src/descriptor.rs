//! Argument schema descriptor: description + compiled validator.

use crate::{Error, Result};
use jsonschema::JSONSchema;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// A validated schema for a tool's arguments.
///
/// Wraps the raw JSON Schema (the machine-consumable description embedded in
/// the tool manifest) together with a compiled validator for incoming
/// payloads. Whether unknown fields are rejected is an explicit per-schema
/// property: schemas are open unless [`closed`](Self::closed) was applied or
/// the source schema already declares `additionalProperties: false`.
pub struct ArgumentSchema {
    raw: Value,
    compiled: JSONSchema,
}

impl ArgumentSchema {
    /// Compile a schema from a raw JSON Schema value.
    pub fn from_value(raw: Value) -> Result<Self> {
        let compiled =
            JSONSchema::compile(&raw).map_err(|e| Error::InvalidSchema(e.to_string()))?;
        Ok(Self { raw, compiled })
    }

    /// Derive a schema from a Rust argument type.
    ///
    /// Generated as draft-07 so the compiled validator and any model-side
    /// consumer agree on dialect. Struct-level serde attributes are
    /// honored, so a type carrying `#[serde(deny_unknown_fields)]`
    /// produces a closed schema.
    pub fn of<T: JsonSchema>() -> Result<Self> {
        let schema = schemars::generate::SchemaSettings::draft07()
            .into_generator()
            .into_root_schema_for::<T>();
        let raw = serde_json::to_value(&schema).map_err(|e| Error::InvalidSchema(e.to_string()))?;
        Self::from_value(raw)
    }

    /// Mark this schema closed: unknown fields are rejected.
    pub fn closed(self) -> Result<Self> {
        let mut raw = self.raw;
        if let Some(obj) = raw.as_object_mut() {
            obj.insert("additionalProperties".to_string(), Value::Bool(false));
        }
        Self::from_value(raw)
    }

    /// Whether unknown fields are rejected.
    pub fn is_closed(&self) -> bool {
        self.raw.get("additionalProperties") == Some(&Value::Bool(false))
    }

    /// The structural description sent to the model.
    ///
    /// Pure and deterministic: this is the schema the descriptor was built
    /// from, independent of any runtime state.
    pub fn describe(&self) -> &Value {
        &self.raw
    }

    /// Validate an untrusted payload against this schema.
    ///
    /// Returns the canonical argument value with declared defaults applied.
    /// Rejects missing required fields, wrong primitive types and
    /// out-of-enum values; rejects unknown fields only if the schema is
    /// closed. Never panics: all failures come back as [`Error::Validation`].
    pub fn validate(&self, raw: &Value) -> Result<Value> {
        let mut args = raw.clone();
        self.apply_defaults(&mut args);

        if let Err(errors) = self.compiled.validate(&args) {
            let detail = errors
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::Validation(detail));
        }

        Ok(args)
    }

    /// Validate a payload and deserialize it into the declared type.
    pub fn validate_as<T: DeserializeOwned>(&self, raw: &Value) -> Result<T> {
        let args = self.validate(raw)?;
        serde_json::from_value(args).map_err(|e| Error::Deserialize(e.to_string()))
    }

    /// Fill missing object fields from top-level `properties.*.default`.
    fn apply_defaults(&self, args: &mut Value) {
        let Some(target) = args.as_object_mut() else {
            return;
        };
        let Some(properties) = self.raw.get("properties").and_then(Value::as_object) else {
            return;
        };

        for (key, prop) in properties {
            if target.contains_key(key) {
                continue;
            }
            if let Some(default) = prop.get("default") {
                target.insert(key.clone(), default.clone());
            }
        }
    }
}

impl fmt::Debug for ArgumentSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSchema")
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn location_schema() -> ArgumentSchema {
        ArgumentSchema::from_value(json!({
            "type": "object",
            "properties": {
                "location": { "type": "string" },
                "unit": { "type": "string", "enum": ["celsius", "fahrenheit"], "default": "fahrenheit" }
            },
            "required": ["location"]
        }))
        .unwrap()
    }

    #[test]
    fn accepts_valid_payload() {
        let schema = location_schema();
        let args = schema
            .validate(&json!({"location": "San Francisco"}))
            .unwrap();
        assert_eq!(args["location"], "San Francisco");
    }

    #[test]
    fn applies_defaults() {
        let schema = location_schema();
        let args = schema.validate(&json!({"location": "Tokyo"})).unwrap();
        assert_eq!(args["unit"], "fahrenheit");
    }

    #[test]
    fn rejects_missing_required_field() {
        let schema = location_schema();
        let err = schema.validate(&json!({"unit": "celsius"})).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn rejects_wrong_primitive_type() {
        let schema = location_schema();
        assert!(schema.validate(&json!({"location": 42})).is_err());
    }

    #[test]
    fn rejects_out_of_enum_value() {
        let schema = location_schema();
        let raw = json!({"location": "Oslo", "unit": "kelvin"});
        assert!(schema.validate(&raw).is_err());
    }

    #[test]
    fn open_schema_accepts_unknown_fields() {
        let schema = location_schema();
        assert!(!schema.is_closed());
        let raw = json!({"location": "Oslo", "altitude": 94});
        assert!(schema.validate(&raw).is_ok());
    }

    #[test]
    fn closed_schema_rejects_unknown_fields() {
        let schema = location_schema().closed().unwrap();
        assert!(schema.is_closed());
        let raw = json!({"location": "Oslo", "altitude": 94});
        assert!(schema.validate(&raw).is_err());
    }

    #[test]
    fn derived_schema_validates_typed_args() {
        #[derive(Debug, Deserialize, JsonSchema)]
        struct Args {
            query: String,
            #[serde(default)]
            limit: Option<u32>,
        }

        let schema = ArgumentSchema::of::<Args>().unwrap();
        assert!(schema.describe().get("properties").is_some());

        let args: Args = schema
            .validate_as(&json!({"query": "rust", "limit": 5}))
            .unwrap();
        assert_eq!(args.query, "rust");
        assert_eq!(args.limit, Some(5));

        assert!(schema.validate_as::<Args>(&json!({"limit": 5})).is_err());
    }

    #[test]
    fn invalid_schema_fails_to_compile() {
        let err = ArgumentSchema::from_value(json!({"type": "not-a-type"})).unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }
}
