//! Extraction of tool-call requests from a raw model response.

use crate::call::ToolCallRequest;
use serde_json::{Map, Value};

/// One entry extracted from a model response, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCall {
    /// A well-formed call envelope.
    Request(ToolCallRequest),
    /// A block that claims to be a call but lacks a valid envelope.
    /// Carried through so the caller can surface it; it never aborts
    /// parsing of subsequent blocks.
    Malformed { raw: Value, reason: String },
}

impl ParsedCall {
    pub fn as_request(&self) -> Option<&ToolCallRequest> {
        match self {
            Self::Request(request) => Some(request),
            Self::Malformed { .. } => None,
        }
    }
}

/// Extract zero or more call requests from a raw model response.
///
/// The response is either an object with a `content` array of blocks or a
/// bare block array. Blocks typed `tool_use` become requests; text and
/// unknown block types carry no calls and are skipped. Order is preserved;
/// it determines outcome order in the fed-back conversation state.
pub fn parse_response(response: &Value) -> Vec<ParsedCall> {
    let blocks = response
        .get("content")
        .and_then(Value::as_array)
        .or_else(|| response.as_array());
    let Some(blocks) = blocks else {
        return Vec::new();
    };

    blocks.iter().filter_map(parse_block).collect()
}

fn parse_block(block: &Value) -> Option<ParsedCall> {
    let obj = block.as_object()?;

    match obj.get("type").and_then(Value::as_str) {
        Some("tool_use") => Some(parse_call(block, obj)),
        // Text and unknown block types carry no calls.
        Some(_) => None,
        // Untyped blocks that still look like call attempts are malformed
        // envelopes, not ignorable noise.
        None if obj.contains_key("id") || obj.contains_key("name") => Some(ParsedCall::Malformed {
            raw: block.clone(),
            reason: "call envelope missing block type".to_string(),
        }),
        None => None,
    }
}

fn parse_call(raw: &Value, obj: &Map<String, Value>) -> ParsedCall {
    let id = match obj.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return malformed(raw, "tool_use block missing string `id`"),
    };
    let name = match obj.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return malformed(raw, "tool_use block missing string `name`"),
    };
    // An absent input is an empty argument object, not an error.
    let args = obj
        .get("input")
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()));

    ParsedCall::Request(ToolCallRequest { id, name, args })
}

fn malformed(raw: &Value, reason: &str) -> ParsedCall {
    ParsedCall::Malformed {
        raw: raw.clone(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_only_response_has_no_calls() {
        let response = json!({
            "content": [{ "type": "text", "text": "No tools needed." }]
        });
        assert!(parse_response(&response).is_empty());
    }

    #[test]
    fn non_object_response_has_no_calls() {
        assert!(parse_response(&json!("just text")).is_empty());
        assert!(parse_response(&json!(null)).is_empty());
    }

    #[test]
    fn extracts_calls_in_emission_order() {
        let response = json!({
            "content": [
                { "type": "text", "text": "Let me check." },
                { "type": "tool_use", "id": "c1", "name": "search", "input": { "query": "a" } },
                { "type": "tool_use", "id": "c2", "name": "read", "input": { "path": "b" } }
            ]
        });
        let parsed = parse_response(&response);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].as_request().unwrap().id, "c1");
        assert_eq!(parsed[1].as_request().unwrap().id, "c2");
    }

    #[test]
    fn accepts_bare_block_array() {
        let response = json!([
            { "type": "tool_use", "id": "c1", "name": "search", "input": {} }
        ]);
        assert_eq!(parse_response(&response).len(), 1);
    }

    #[test]
    fn missing_input_defaults_to_empty_object() {
        let response = json!({
            "content": [{ "type": "tool_use", "id": "c1", "name": "ping" }]
        });
        let parsed = parse_response(&response);
        assert_eq!(parsed[0].as_request().unwrap().args, json!({}));
    }

    #[test]
    fn malformed_call_does_not_drop_later_calls() {
        let response = json!({
            "content": [
                { "type": "tool_use", "name": "search", "input": {} },
                { "type": "tool_use", "id": "c2", "name": "read", "input": {} }
            ]
        });
        let parsed = parse_response(&response);
        assert_eq!(parsed.len(), 2);
        assert!(matches!(&parsed[0], ParsedCall::Malformed { reason, .. }
            if reason.contains("id")));
        assert_eq!(parsed[1].as_request().unwrap().id, "c2");
    }

    #[test]
    fn untyped_call_attempt_is_malformed() {
        let response = json!({
            "content": [{ "id": "c1", "name": "search", "input": {} }]
        });
        let parsed = parse_response(&response);
        assert!(matches!(&parsed[0], ParsedCall::Malformed { .. }));
    }

    #[test]
    fn non_string_id_is_malformed() {
        let response = json!({
            "content": [{ "type": "tool_use", "id": 7, "name": "search", "input": {} }]
        });
        assert!(matches!(&parse_response(&response)[0], ParsedCall::Malformed { .. }));
    }
}
