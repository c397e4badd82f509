//! Decision extractor
//!
//! Finds the JSON decision object inside a model response that may be
//! wrapped in prose, markdown fences or a reasoning block.
//!
//! 1. Drop everything up to and including the first closing reasoning
//!    delimiter that follows its opening delimiter (`<reasoning>`,
//!    `<think>`, `<thinking>`).
//! 2. If the remainder is itself valid JSON but not an object, fail with
//!    `NotAnObject`.
//! 3. Try the widest span, first `{` to last `}`.
//! 4. If that does not parse to an object, try each brace-balanced
//!    top-level span in order of appearance. Braces inside JSON strings
//!    are not counted.
//! 5. The first candidate that parses to an object wins; otherwise the
//!    failure from step 3 is reported.
//!
//! Extraction is pure: the same text always yields the same decision.

use serde_json::Value;
use tracing::warn;

use domain_claims::{DecisionKind, ExtractedDecision, ExtractionFailure};

const REASONING_DELIMITERS: &[(&str, &str)] = &[
    ("<reasoning>", "</reasoning>"),
    ("<thinking>", "</thinking>"),
    ("<think>", "</think>"),
];

pub fn extract(kind: DecisionKind, raw_text: &str) -> ExtractedDecision {
    let decision = match find_object(raw_text) {
        Ok(fields) => ExtractedDecision::parsed(kind, fields),
        Err(failure) => ExtractedDecision::failed(kind, failure),
    };
    if let Some(failure) = &decision.failure {
        warn!(kind = %kind, failure = %failure, "decision extraction failed");
    }
    decision
}

fn find_object(raw_text: &str) -> Result<serde_json::Map<String, Value>, ExtractionFailure> {
    let text = strip_reasoning(raw_text).trim();
    if text.is_empty() {
        return Err(ExtractionFailure::EmptyResponse);
    }

    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return match value {
            Value::Object(map) => Ok(map),
            _ => Err(ExtractionFailure::NotAnObject),
        };
    }

    let widest = widest_span(text).ok_or(ExtractionFailure::NoObjectFound)?;
    let widest_failure = match parse_object(widest) {
        Ok(map) => return Ok(map),
        Err(failure) => failure,
    };

    balanced_spans(text)
        .into_iter()
        .filter(|span| *span != widest)
        .find_map(|span| parse_object(span).ok())
        .ok_or(widest_failure)
}

/// Text after the first complete reasoning block, or the input unchanged
pub fn strip_reasoning(text: &str) -> &str {
    REASONING_DELIMITERS
        .iter()
        .filter_map(|(open, close)| {
            let start = text.find(open)?;
            let after_open = start + open.len();
            let end = text[after_open..].find(close)? + after_open + close.len();
            Some((start, end))
        })
        .min_by_key(|(start, _)| *start)
        .map(|(_, end)| &text[end..])
        .unwrap_or(text)
}

fn widest_span(text: &str) -> Option<&str> {
    let first = text.find('{')?;
    let last = text.rfind('}')?;
    (first < last).then(|| &text[first..=last])
}

/// Top-level `{...}` spans with balanced braces, in order of appearance
fn balanced_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if depth > 0 && in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = index;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..=index]);
                }
            }
            _ => {}
        }
    }
    spans
}

fn parse_object(span: &str) -> Result<serde_json::Map<String, Value>, ExtractionFailure> {
    match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ExtractionFailure::NotAnObject),
        Err(err) => Err(ExtractionFailure::InvalidJson(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KIND: DecisionKind = DecisionKind::ClaimAdjudication;

    #[test]
    fn test_reasoning_block_is_discarded() {
        let decision = extract(KIND, "<reasoning>The {claim} looks fine.</reasoning>{\"status\":\"Valid\"}");
        assert!(decision.extraction_ok);
        assert_eq!(decision.fields["status"], "Valid");
        assert_eq!(decision.fields.len(), 1);
    }

    #[test]
    fn test_think_block_is_discarded() {
        let decision = extract(KIND, "<think>maybe {\"status\": \"Invalid\"}?</think>\n{\"status\": \"Valid\"}");
        assert_eq!(decision.fields["status"], "Valid");
    }

    #[test]
    fn test_unclosed_reasoning_is_left_alone() {
        let text = "<reasoning>still thinking {\"status\":\"Valid\"}";
        assert_eq!(strip_reasoning(text), text);
        assert!(extract(KIND, text).extraction_ok);
    }

    #[test]
    fn test_closing_before_opening_is_ignored() {
        let text = "</reasoning> noise <reasoning>x</reasoning>{\"a\":1}";
        assert_eq!(strip_reasoning(text), "{\"a\":1}");
    }

    #[test]
    fn test_prose_and_fences_around_object() {
        let text = "Here is my analysis:\n```json\n{\"validation\": {\"status\": \"Valid\"}}\n```\nLet me know!";
        let decision = extract(KIND, text);
        assert!(decision.extraction_ok);
        assert_eq!(decision.view().text("validation.status").as_deref(), Some("Valid"));
    }

    #[test]
    fn test_no_braces_fails() {
        let decision = extract(KIND, "I cannot help with that.");
        assert_eq!(decision.failure, Some(ExtractionFailure::NoObjectFound));
        assert!(decision.fields.is_empty());
    }

    #[test]
    fn test_reversed_braces_fail() {
        let decision = extract(KIND, "} nothing here {");
        assert_eq!(decision.failure, Some(ExtractionFailure::NoObjectFound));
    }

    #[test]
    fn test_empty_response() {
        assert_eq!(extract(KIND, "   ").failure, Some(ExtractionFailure::EmptyResponse));
        assert_eq!(
            extract(KIND, "<think>only thoughts</think>").failure,
            Some(ExtractionFailure::EmptyResponse)
        );
    }

    #[test]
    fn test_bare_array_is_not_an_object() {
        let decision = extract(KIND, "[{\"status\": \"Valid\"}]");
        assert_eq!(decision.failure, Some(ExtractionFailure::NotAnObject));
        assert_eq!(extract(KIND, "42").failure, Some(ExtractionFailure::NotAnObject));
    }

    #[test]
    fn test_malformed_json_reports_parse_error() {
        let decision = extract(KIND, "{\"status\": \"Valid\",}");
        assert!(matches!(decision.failure, Some(ExtractionFailure::InvalidJson(_))));
    }

    #[test]
    fn test_trailing_unrelated_block_falls_back_to_balanced_span() {
        let text = "{\"status\": \"Valid\"} and some notes about {placeholders}";
        let decision = extract(KIND, text);
        assert!(decision.extraction_ok);
        assert_eq!(decision.fields["status"], "Valid");
    }

    #[test]
    fn test_braces_inside_strings_do_not_split_objects() {
        let text = "Answer: {\"note\": \"use {curly} braces }\", \"ok\": true} (see {ref})";
        let decision = extract(KIND, text);
        assert!(decision.extraction_ok);
        assert_eq!(decision.fields["note"], "use {curly} braces }");
        assert_eq!(decision.fields["ok"], json!(true));
    }

    #[test]
    fn test_extra_fields_are_retained() {
        let decision = extract(KIND, "{\"status\": \"Valid\", \"model\": \"x\", \"nested\": {\"k\": [1,2]}}");
        assert_eq!(decision.fields.len(), 3);
        assert_eq!(decision.fields["nested"], json!({"k": [1, 2]}));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Map};

    fn prose() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 .,:;!?'\\n-]{0,200}"
    }

    fn decision_object() -> impl Strategy<Value = Map<String, Value>> {
        (
            "[A-Za-z ]{1,20}",
            prop::collection::vec("[A-Za-z {}\\[\\]]{0,15}", 0..4),
            any::<bool>(),
            -1_000_000i64..1_000_000i64,
        )
            .prop_map(|(status, issues, flag, amount)| {
                json!({
                    "status": status,
                    "issues": issues,
                    "refile_required": flag,
                    "eob_amount": amount,
                })
                .as_object()
                .cloned()
                .unwrap_or_default()
            })
    }

    proptest! {
        #[test]
        fn object_after_reasoning_and_prose_is_recovered(
            object in decision_object(),
            before in prose(),
            reasoning in prose(),
        ) {
            let body = serde_json::to_string(&object).unwrap();
            let text = format!("<reasoning>{reasoning}{before}</reasoning>{before}{body}");
            let decision = extract(DecisionKind::EobGeneration, &text);

            prop_assert!(decision.extraction_ok);
            prop_assert_eq!(decision.fields, object);
        }

        #[test]
        fn text_without_braces_never_extracts(text in "[^{}]{0,300}") {
            let decision = extract(DecisionKind::Refile, &text);
            prop_assert!(!decision.extraction_ok);
            prop_assert!(decision.fields.is_empty());
        }

        #[test]
        fn extraction_is_idempotent(text in ".{0,300}") {
            let first = extract(DecisionKind::Chat, &text);
            let second = extract(DecisionKind::Chat, &text);
            prop_assert_eq!(first, second);
        }
    }
}
