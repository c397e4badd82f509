//! Response envelope normalization
//!
//! Reasoning and delegation services wrap the model's text in different
//! shapes. `normalize` reduces any of them to plain text:
//!
//! | shape | text taken from |
//! |---|---|
//! | chat completion | `choices[0].message.content` or `choices[0].text` |
//! | plain text | `results[0].outputText`, `generated_text`, `completion`, `outputText` |
//! | content array | every `content[].text`, joined |
//! | delegation | `response` or `analysis`; `body` as object or JSON string |
//! | anything else that is an object | the object itself, re-serialized |
//!
//! An `errorMessage` (function invocation failure) or `error` field is a
//! transport failure, not text.

use serde_json::Value;

use crate::error::TransportError;

/// Keys that mark a delegation reply as a complete structure
const STRUCTURED_REPLY_KEYS: &[&str] = &["suggestions", "actionData"];

pub fn normalize(envelope: &Value) -> Result<String, TransportError> {
    match envelope {
        Value::String(text) => Ok(text.clone()),
        Value::Object(map) => {
            if let Some(message) = map.get("errorMessage") {
                return Err(TransportError::Remote(render(message)));
            }
            if let Some(error) = map.get("error").filter(|error| !error.is_null()) {
                return Err(TransportError::Remote(render(error)));
            }

            if let Some(text) = chat_completion(envelope) {
                return Ok(text);
            }
            if let Some(text) = envelope
                .pointer("/results/0/outputText")
                .and_then(Value::as_str)
            {
                return Ok(text.to_string());
            }
            if let Some(Value::Array(blocks)) = map.get("content") {
                let text = join_text_blocks(blocks);
                if !text.is_empty() {
                    return Ok(text);
                }
            }
            for key in ["generated_text", "completion", "outputText"] {
                if let Some(text) = map.get(key).and_then(Value::as_str) {
                    return Ok(text.to_string());
                }
            }

            if let Some(body) = map.get("body") {
                return match body {
                    Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                        Ok(inner) => normalize(&inner),
                        Err(_) => Ok(raw.clone()),
                    },
                    other => normalize(other),
                };
            }

            let structured = STRUCTURED_REPLY_KEYS.iter().any(|key| map.contains_key(*key));
            for key in ["response", "analysis"] {
                match map.get(key) {
                    Some(Value::String(text)) if !structured => return Ok(text.clone()),
                    Some(inner @ Value::Object(_)) => return normalize(inner),
                    _ => {}
                }
            }

            Ok(envelope.to_string())
        }
        Value::Array(items) => match items.first() {
            Some(first @ Value::Object(map)) if map.contains_key("generated_text") => normalize(first),
            _ => Ok(envelope.to_string()),
        },
        Value::Null => Err(TransportError::Envelope("empty envelope".to_string())),
        other => Err(TransportError::Envelope(format!("unexpected envelope: {other}"))),
    }
}

fn chat_completion(envelope: &Value) -> Option<String> {
    let choice = envelope.pointer("/choices/0")?;
    choice
        .pointer("/message/content")
        .or_else(|| choice.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn join_text_blocks(blocks: &[Value]) -> String {
    blocks
        .iter()
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_completion() {
        let envelope = json!({"choices": [{"message": {"role": "assistant", "content": "{\"a\":1}"}}]});
        assert_eq!(normalize(&envelope).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_plain_text_shapes() {
        assert_eq!(
            normalize(&json!({"results": [{"outputText": "hello"}]})).unwrap(),
            "hello"
        );
        assert_eq!(normalize(&json!({"generated_text": "hi"})).unwrap(), "hi");
        assert_eq!(normalize(&json!([{"generated_text": "hey"}])).unwrap(), "hey");
        assert_eq!(normalize(&json!("bare")).unwrap(), "bare");
    }

    #[test]
    fn test_content_array_is_joined() {
        let envelope = json!({"content": [
            {"type": "text", "text": "part one"},
            {"type": "image"},
            {"type": "text", "text": "part two"}
        ]});
        assert_eq!(normalize(&envelope).unwrap(), "part one\npart two");
    }

    #[test]
    fn test_delegation_response_string() {
        let envelope = json!({"response": "{\"eob_amount\": 10}", "timestamp": "2026-10-16T10:00:00"});
        assert_eq!(normalize(&envelope).unwrap(), "{\"eob_amount\": 10}");
    }

    #[test]
    fn test_structured_reply_is_kept_whole() {
        let envelope = json!({"response": "Hello", "suggestions": ["Next"], "actionData": {"type": "none"}});
        let text = normalize(&envelope).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_body_as_json_string_and_object() {
        let nested = json!({"statusCode": 200, "body": "{\"response\": \"inner\"}"});
        assert_eq!(normalize(&nested).unwrap(), "inner");

        let object = json!({"statusCode": 200, "body": {"choices": [{"text": "deep"}]}});
        assert_eq!(normalize(&object).unwrap(), "deep");

        let prose = json!({"body": "not json at all"});
        assert_eq!(normalize(&prose).unwrap(), "not json at all");
    }

    #[test]
    fn test_direct_structure_is_reserialized() {
        let envelope = json!({"status": "approved", "eob_amount": 80});
        let parsed: Value = serde_json::from_str(&normalize(&envelope).unwrap()).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_error_envelopes_are_failures() {
        let err = normalize(&json!({"errorMessage": "Task timed out", "errorType": "Timeout"})).unwrap_err();
        assert_eq!(err, TransportError::Remote("Task timed out".to_string()));
        assert!(normalize(&json!({"error": {"code": 429}})).is_err());
        assert!(normalize(&Value::Null).is_err());
        assert!(normalize(&json!(7)).is_err());
    }
}
