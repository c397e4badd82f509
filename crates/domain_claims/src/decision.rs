//! Decision requests and extracted decisions
//!
//! A `DecisionRequest` names the kind of judgment wanted and carries the
//! context the prompt is rendered from. The model's answer comes back as an
//! `ExtractedDecision`: the raw JSON fields, or an `ExtractionFailure`
//! describing why no object could be recovered.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use core_kernel::{Currency, Money};
use crate::error::ClaimError;

/// The fixed categories of AI-assisted judgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Registration risk and data-quality assessment
    Registration,
    /// Three-signal claim adjudication
    ClaimAdjudication,
    /// Suggestions after a claim was denied
    DenialAnalysis,
    /// Explanation of benefits for a claim
    EobGeneration,
    /// Review of an existing explanation of benefits
    EobAnalysis,
    /// Refile recommendation for an EOB
    Refile,
    /// Improvement suggestions for an open claim
    ClaimSuggestions,
    /// Free-form assistant query
    Chat,
}

impl DecisionKind {
    pub const ALL: [DecisionKind; 8] = [
        DecisionKind::Registration,
        DecisionKind::ClaimAdjudication,
        DecisionKind::DenialAnalysis,
        DecisionKind::EobGeneration,
        DecisionKind::EobAnalysis,
        DecisionKind::Refile,
        DecisionKind::ClaimSuggestions,
        DecisionKind::Chat,
    ];

    /// Context fields a request of this kind must carry
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            DecisionKind::Registration => &[
                "first_name",
                "last_name",
                "email",
                "phone",
                "date_of_birth",
                "insurance_id",
                "insurance_provider",
            ],
            DecisionKind::ClaimAdjudication => {
                &["patient_id", "claim_amount", "claim_type", "description"]
            }
            DecisionKind::DenialAnalysis => &["claim_id", "denial_reason"],
            DecisionKind::EobGeneration => &["claim_id", "patient_id", "claim_amount", "claim_type"],
            DecisionKind::EobAnalysis => &["eob_id", "eob_amount", "eob_status", "payer"],
            DecisionKind::Refile => &["eob_status", "payer", "refile_reason"],
            DecisionKind::ClaimSuggestions => {
                &["claim_id", "claim_amount", "claim_type", "description", "claim_status"]
            }
            DecisionKind::Chat => &["message"],
        }
    }

    /// Context fields rendered as "unknown" when absent
    pub fn optional_fields(&self) -> &'static [&'static str] {
        match self {
            DecisionKind::EobGeneration => &["description", "claim_status"],
            DecisionKind::EobAnalysis => &["claim_amount", "eob_date"],
            DecisionKind::Refile => &["eob_amount", "denial_reasons"],
            DecisionKind::ClaimSuggestions => &["approval_required", "prior_analysis"],
            _ => &[],
        }
    }

    /// Advisory kinds produce suggestions and never move a claim
    pub fn is_advisory(&self) -> bool {
        !matches!(self, DecisionKind::ClaimAdjudication | DecisionKind::EobGeneration)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionKind::Registration => "registration",
            DecisionKind::ClaimAdjudication => "claim_adjudication",
            DecisionKind::DenialAnalysis => "denial_analysis",
            DecisionKind::EobGeneration => "eob_generation",
            DecisionKind::EobAnalysis => "eob_analysis",
            DecisionKind::Refile => "refile",
            DecisionKind::ClaimSuggestions => "claim_suggestions",
            DecisionKind::Chat => "chat",
        }
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        DecisionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown decision kind: {s}"))
    }
}

/// A single context value handed to the prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Text(String),
    Number(Decimal),
}

impl ContextValue {
    fn is_blank(&self) -> bool {
        matches!(self, ContextValue::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Text(text) => f.write_str(text),
            ContextValue::Number(number) => write!(f, "{}", number.normalize()),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Text(value)
    }
}

impl From<Decimal> for ContextValue {
    fn from(value: Decimal) -> Self {
        ContextValue::Number(value)
    }
}

impl From<Money> for ContextValue {
    fn from(value: Money) -> Self {
        ContextValue::Number(value.round_to_currency().amount())
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Text(value.to_string())
    }
}

/// A request for one decision, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub kind: DecisionKind,
    #[serde(default)]
    pub context: BTreeMap<String, ContextValue>,
}

impl DecisionRequest {
    pub fn new(kind: DecisionKind) -> Self {
        Self {
            kind,
            context: BTreeMap::new(),
        }
    }

    /// Adds a context field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Adds a context field only when a value is present
    pub fn with_opt<V: Into<ContextValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.context.get(key).filter(|value| !value.is_blank())
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(ToString::to_string)
    }

    /// Reads an amount in the request's `currency` field, USD when absent
    pub fn money(&self, key: &str) -> Option<Money> {
        let currency = self
            .text("currency")
            .and_then(|code| serde_json::from_value(Value::String(code.trim().to_ascii_uppercase())).ok())
            .unwrap_or(Currency::USD);
        match self.get(key)? {
            ContextValue::Number(amount) => Some(Money::new(*amount, currency)),
            ContextValue::Text(text) => Money::parse_lenient(text, currency).ok(),
        }
    }

    /// Checks that every required field is present and non-blank
    pub fn validate(&self) -> Result<(), ClaimError> {
        match self
            .kind
            .required_fields()
            .iter()
            .find(|field| self.get(field).is_none())
        {
            Some(field) => Err(ClaimError::MissingContextField {
                kind: self.kind.to_string(),
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Why no decision object could be recovered from the model's text
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "class", content = "detail", rename_all = "snake_case")]
pub enum ExtractionFailure {
    #[error("response was empty")]
    EmptyResponse,

    #[error("no JSON object span found")]
    NoObjectFound,

    #[error("JSON did not parse: {0}")]
    InvalidJson(String),

    #[error("JSON value is not an object")]
    NotAnObject,

    #[error("inference service unavailable")]
    InferenceUnavailable,
}

/// The structured result of reading one model response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDecision {
    pub kind: DecisionKind,
    pub fields: Map<String, Value>,
    pub extraction_ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<ExtractionFailure>,
}

impl ExtractedDecision {
    /// A successful extraction
    pub fn parsed(kind: DecisionKind, fields: Map<String, Value>) -> Self {
        Self {
            kind,
            fields,
            extraction_ok: true,
            failure: None,
        }
    }

    /// A failed extraction; fields are always empty
    pub fn failed(kind: DecisionKind, failure: ExtractionFailure) -> Self {
        Self {
            kind,
            fields: Map::new(),
            extraction_ok: false,
            failure: Some(failure),
        }
    }

    /// Stand-in used when the inference service could not be reached
    pub fn unavailable(kind: DecisionKind) -> Self {
        Self::failed(kind, ExtractionFailure::InferenceUnavailable)
    }

    pub fn is_unavailable(&self) -> bool {
        self.failure == Some(ExtractionFailure::InferenceUnavailable)
    }

    /// Typed, forgiving view over the fields
    pub fn view(&self) -> Fields<'_> {
        Fields { map: &self.fields }
    }
}

/// Read-only accessor over decision fields
///
/// Paths are dotted (`"coverageCheck.coverageDecision"`). Keys match
/// exactly first, then ignoring case, `_` and `-`, so `coverage_decision`
/// finds `coverageDecision`. Every accessor returns `None` instead of
/// failing when a value is missing or has an unexpected shape.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    pub fn value(&self, path: &str) -> Option<&'a Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = lookup(self.map, first)?;
        for segment in segments {
            current = lookup(current.as_object()?, segment)?;
        }
        Some(current)
    }

    /// Non-empty text; numbers and booleans are rendered as text
    pub fn text(&self, path: &str) -> Option<String> {
        let text = match self.value(path)? {
            Value::String(text) => text.trim().to_string(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// A list of non-empty strings; a lone string becomes a one-item list
    pub fn strings(&self, path: &str) -> Option<Vec<String>> {
        match self.value(path)? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text.trim().to_string()),
                        Value::Number(number) => Some(number.to_string()),
                        _ => None,
                    })
                    .filter(|text| !text.is_empty())
                    .collect(),
            ),
            Value::String(text) if !text.trim().is_empty() => Some(vec![text.trim().to_string()]),
            _ => None,
        }
    }

    pub fn flag(&self, path: &str) -> Option<bool> {
        match self.value(path)? {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "required" => Some(true),
                "false" | "no" | "not required" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn decimal(&self, path: &str) -> Option<Decimal> {
        match self.value(path)? {
            Value::Number(number) => {
                let text = number.to_string();
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .ok()
            }
            Value::String(text) => {
                let cleaned: String = text
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                    .collect();
                Decimal::from_str(&cleaned).ok()
            }
            _ => None,
        }
    }

    pub fn object(&self, path: &str) -> Option<&'a Map<String, Value>> {
        self.value(path)?.as_object()
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(key) {
        return Some(value);
    }
    let wanted = normalize_key(key);
    map.iter()
        .find(|(candidate, _)| normalize_key(candidate) == wanted)
        .map(|(_, value)| value)
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in DecisionKind::ALL {
            assert_eq!(kind.as_str().parse::<DecisionKind>().unwrap(), kind);
        }
        assert_eq!("claim-adjudication".parse::<DecisionKind>().unwrap(), DecisionKind::ClaimAdjudication);
        assert!("payroll".parse::<DecisionKind>().is_err());
    }

    #[test]
    fn test_only_adjudication_and_eob_generation_are_not_advisory() {
        let binding: Vec<_> = DecisionKind::ALL.into_iter().filter(|k| !k.is_advisory()).collect();
        assert_eq!(binding, vec![DecisionKind::ClaimAdjudication, DecisionKind::EobGeneration]);
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let request = DecisionRequest::new(DecisionKind::DenialAnalysis).with("claim_id", "CLM-1");
        let err = request.validate().unwrap_err();
        assert!(matches!(
            err,
            ClaimError::MissingContextField { ref field, .. } if field == "denial_reason"
        ));
    }

    #[test]
    fn test_blank_text_counts_as_missing() {
        let request = DecisionRequest::new(DecisionKind::Chat).with("message", "   ");
        assert!(request.validate().is_err());
        assert!(request.get("message").is_none());
    }

    #[test]
    fn test_context_value_display() {
        assert_eq!(ContextValue::from(dec!(1200.50)).to_string(), "1200.5");
        assert_eq!(ContextValue::from("Outpatient").to_string(), "Outpatient");
    }

    #[test]
    fn test_failed_extraction_has_no_fields() {
        let decision = ExtractedDecision::failed(DecisionKind::Refile, ExtractionFailure::NoObjectFound);
        assert!(!decision.extraction_ok);
        assert!(decision.fields.is_empty());
        assert!(!decision.is_unavailable());
        assert!(ExtractedDecision::unavailable(DecisionKind::Refile).is_unavailable());
    }

    #[test]
    fn test_fields_nested_and_normalized_lookup() {
        let map = fields(json!({
            "coverageCheck": {"coverageDecision": "Approved"},
            "fraud_risk_assessment": {"recommendation": "Approve"}
        }));
        let view = Fields::new(&map);

        assert_eq!(view.text("coverageCheck.coverageDecision").as_deref(), Some("Approved"));
        assert_eq!(view.text("fraudRiskAssessment.recommendation").as_deref(), Some("Approve"));
        assert_eq!(view.text("coverage_check.coverage_decision").as_deref(), Some("Approved"));
        assert!(view.text("validation.status").is_none());
    }

    #[test]
    fn test_fields_lenient_shapes() {
        let map = fields(json!({
            "amount": "$1,250.75",
            "count": 3,
            "reasons": ["Missing modifier", "", 42, null],
            "single": "Prior authorization",
            "refile": "yes",
            "blank": "  "
        }));
        let view = Fields::new(&map);

        assert_eq!(view.decimal("amount"), Some(dec!(1250.75)));
        assert_eq!(view.decimal("count"), Some(dec!(3)));
        assert_eq!(
            view.strings("reasons"),
            Some(vec!["Missing modifier".to_string(), "42".to_string()])
        );
        assert_eq!(view.strings("single"), Some(vec!["Prior authorization".to_string()]));
        assert_eq!(view.flag("refile"), Some(true));
        assert!(view.text("blank").is_none());
    }
}
