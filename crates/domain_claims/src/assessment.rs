//! Typed decision records
//!
//! One record per decision kind, every field populated. The adjudication
//! policy builds these from an `ExtractedDecision`, substituting a default
//! for each field the model left out, so callers never see a partial record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use core_kernel::Money;
use crate::eob::EobStatus;

/// Fallback text for fields the model did not provide
pub const PENDING_REVIEW: &str = "Pending Review";
pub const UNKNOWN: &str = "Unknown";

/// Registration risk and data-quality assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationAssessment {
    pub insurance_eligibility: String,
    pub risk_level: String,
    pub justification: String,
    pub completeness: String,
    pub format_consistency: String,
    pub overall_quality: String,
    pub provider_valid: String,
    pub id_format: String,
    pub coverage_status: String,
    pub verification_recommendations: Vec<String>,
    pub potential_fraud_indicators: Vec<String>,
}

impl Default for RegistrationAssessment {
    fn default() -> Self {
        Self {
            insurance_eligibility: PENDING_REVIEW.to_string(),
            risk_level: UNKNOWN.to_string(),
            justification: "Automated assessment unavailable; manual verification required".to_string(),
            completeness: UNKNOWN.to_string(),
            format_consistency: UNKNOWN.to_string(),
            overall_quality: UNKNOWN.to_string(),
            provider_valid: UNKNOWN.to_string(),
            id_format: UNKNOWN.to_string(),
            coverage_status: PENDING_REVIEW.to_string(),
            verification_recommendations: vec![
                "Verify insurance details with the provider".to_string(),
                "Confirm patient identity documents".to_string(),
            ],
            potential_fraud_indicators: Vec::new(),
        }
    }
}

/// The three adjudication signals plus supporting detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimAssessment {
    pub fraud_recommendation: String,
    pub coverage_decision: String,
    pub validation_status: String,
    pub risk_level: String,
    pub risk_factors: Vec<String>,
    pub validation_issues: Vec<String>,
    pub required_documents: Vec<String>,
    pub next_steps: Vec<String>,
}

/// Advice after a denial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenialAnalysis {
    pub root_cause: String,
    pub required_documentation: Vec<String>,
    pub resolution_steps: Vec<String>,
    pub success_likelihood: String,
    pub alternative_options: Vec<String>,
    pub priority: String,
}

/// Everything needed to issue an EOB record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EobDraft {
    pub amount: Money,
    pub status: EobStatus,
    pub eob_date: NaiveDate,
    pub payer: String,
    pub summary: String,
    pub denial_reasons: Vec<String>,
    pub refile_required: bool,
    /// True when any field fell back to the conservative default
    pub degraded: bool,
}

impl EobDraft {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Review of an issued EOB
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EobAnalysis {
    pub summary: String,
    pub coverage_analysis: String,
    pub denial_reasons: Vec<String>,
    pub recommendations: Vec<String>,
    pub refile_required: bool,
    pub refile_priority: String,
    pub next_steps: Vec<String>,
    pub confidence_score: u8,
}

/// Recommendation for resubmitting a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefileRecommendation {
    pub justification: String,
    pub required_documents: Vec<String>,
    pub modifications_needed: Vec<String>,
    pub priority: String,
    pub estimated_success: u8,
    pub timeline: String,
    pub next_steps: Vec<String>,
}

/// Improvement suggestions for an open claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSuggestions {
    pub root_cause: String,
    pub suggestions: Vec<String>,
    pub priority: String,
    pub estimated_impact: String,
}

/// Assistant reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub response: String,
    pub suggestions: Vec<String>,
    pub action_data: Value,
}

impl ChatReply {
    pub fn action_type(&self) -> Option<&str> {
        self.action_data.get("type").and_then(Value::as_str)
    }
}

/// A decoded decision, one variant per kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    Registration(RegistrationAssessment),
    ClaimAdjudication(ClaimAssessment),
    DenialAnalysis(DenialAnalysis),
    EobGeneration(EobDraft),
    EobAnalysis(EobAnalysis),
    Refile(RefileRecommendation),
    ClaimSuggestions(ClaimSuggestions),
    Chat(ChatReply),
}

impl Decision {
    /// JSON form stored in `ai_analysis` / `ai_suggestions` columns
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| json!({}))
    }

    /// Same as `to_value` but without the `kind` tag
    pub fn to_record(&self) -> Map<String, Value> {
        match self.to_value() {
            Value::Object(mut map) => {
                map.remove("kind");
                map
            }
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_defaults_are_conservative() {
        let assessment = RegistrationAssessment::default();
        assert_eq!(assessment.insurance_eligibility, PENDING_REVIEW);
        assert_eq!(assessment.risk_level, UNKNOWN);
        assert!(!assessment.verification_recommendations.is_empty());
    }

    #[test]
    fn test_decision_is_tagged_by_kind() {
        let decision = Decision::ClaimSuggestions(ClaimSuggestions {
            root_cause: "Missing modifier".to_string(),
            suggestions: vec!["Add modifier 25".to_string()],
            priority: "High".to_string(),
            estimated_impact: "Faster approval".to_string(),
        });
        let value = decision.to_value();
        assert_eq!(value["kind"], "claim_suggestions");
        assert_eq!(value["rootCause"], "Missing modifier");

        let record = decision.to_record();
        assert!(!record.contains_key("kind"));
        assert_eq!(record["priority"], "High");
    }
}
