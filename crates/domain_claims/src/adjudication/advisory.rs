//! Advisory decisions
//!
//! None of these move a claim. Each one reads what the model returned and
//! fills every missing field with a fixed default, so a failed or partial
//! extraction still yields a complete record.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;

use crate::assessment::{
    ChatReply, ClaimSuggestions, DenialAnalysis, RefileRecommendation, RegistrationAssessment,
};
use crate::decision::ExtractedDecision;

/// Reply given when the assistant cannot reach the inference service
pub const OFFLINE_CHAT_REPLY: &str = "I'm currently running in offline mode. I can still help \
with patient registration, claim submission and EOB review through the standard forms, but AI \
analysis is temporarily unavailable.";

const DEFAULT_PRIORITY: &str = "Medium";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

pub fn assess_registration(decision: &ExtractedDecision) -> RegistrationAssessment {
    let fields = decision.view();
    let defaults = RegistrationAssessment::default();

    RegistrationAssessment {
        insurance_eligibility: fields
            .text("riskAssessment.insuranceEligibility")
            .unwrap_or(defaults.insurance_eligibility),
        risk_level: fields.text("riskAssessment.riskLevel").unwrap_or(defaults.risk_level),
        justification: fields
            .text("riskAssessment.justification")
            .unwrap_or(defaults.justification),
        completeness: fields
            .text("dataQualityAnalysis.completeness")
            .unwrap_or(defaults.completeness),
        format_consistency: fields
            .text("dataQualityAnalysis.formatConsistency")
            .unwrap_or(defaults.format_consistency),
        overall_quality: fields
            .text("dataQualityAnalysis.overallQuality")
            .unwrap_or(defaults.overall_quality),
        provider_valid: fields
            .text("insuranceVerification.providerValid")
            .unwrap_or(defaults.provider_valid),
        id_format: fields
            .text("insuranceVerification.idFormat")
            .unwrap_or(defaults.id_format),
        coverage_status: fields
            .text("insuranceVerification.coverageStatus")
            .unwrap_or(defaults.coverage_status),
        verification_recommendations: fields
            .strings("verificationRecommendations")
            .filter(|items| !items.is_empty())
            .unwrap_or(defaults.verification_recommendations),
        potential_fraud_indicators: fields
            .strings("potentialFraudIndicators")
            .unwrap_or(defaults.potential_fraud_indicators),
    }
}

pub fn analyze_denial(decision: &ExtractedDecision, denial_reason: &str) -> DenialAnalysis {
    let fields = decision.view();

    DenialAnalysis {
        root_cause: fields
            .text("rootCauseAnalysis")
            .unwrap_or_else(|| format!("Claim denied: {denial_reason}")),
        required_documentation: fields
            .strings("requiredDocumentation")
            .filter(|items| !items.is_empty())
            .unwrap_or_else(|| strings(&["Itemized bill", "Supporting medical records"])),
        resolution_steps: fields
            .strings("resolutionSteps")
            .filter(|items| !items.is_empty())
            .unwrap_or_else(|| {
                strings(&[
                    "Review the denial reason with the billing team",
                    "Correct the claim and resubmit",
                ])
            }),
        success_likelihood: fields
            .text("successLikelihood")
            .unwrap_or_else(|| crate::assessment::UNKNOWN.to_string()),
        alternative_options: fields
            .strings("alternativeOptions")
            .unwrap_or_else(|| strings(&["File an appeal with the payer"])),
        priority: fields
            .text("priority")
            .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
    }
}

pub fn recommend_refile(decision: &ExtractedDecision, reason: &str) -> RefileRecommendation {
    let fields = decision.view();

    RefileRecommendation {
        justification: fields
            .text("refile_justification")
            .unwrap_or_else(|| format!("Claim refile recommended due to: {reason}")),
        required_documents: fields
            .strings("required_documents")
            .filter(|items| !items.is_empty())
            .unwrap_or_else(|| strings(&["Updated medical records", "Additional documentation"])),
        modifications_needed: fields
            .strings("modifications_needed")
            .filter(|items| !items.is_empty())
            .unwrap_or_else(|| strings(&["Review claim details", "Update billing codes"])),
        priority: fields
            .text("priority")
            .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        estimated_success: percent(fields.decimal("estimated_success")).unwrap_or(75),
        timeline: fields
            .text("timeline")
            .unwrap_or_else(|| "2-3 weeks".to_string()),
        next_steps: fields
            .strings("next_steps")
            .filter(|items| !items.is_empty())
            .unwrap_or_else(|| strings(&["Gather required documents", "Submit refile request"])),
    }
}

pub fn suggest_improvements(decision: &ExtractedDecision) -> ClaimSuggestions {
    let fields = decision.view();

    ClaimSuggestions {
        root_cause: fields
            .text("root_cause")
            .unwrap_or_else(|| "Claim requires additional review".to_string()),
        suggestions: fields
            .strings("suggestions")
            .filter(|items| !items.is_empty())
            .unwrap_or_else(|| {
                strings(&[
                    "Confirm the claim description matches the billed services",
                    "Attach supporting medical documentation",
                ])
            }),
        priority: fields
            .text("priority")
            .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        estimated_impact: fields
            .text("estimated_impact")
            .unwrap_or_else(|| "Improved likelihood of approval".to_string()),
    }
}

/// Builds the assistant reply; plain prose from the model is used as-is
pub fn reply_to_chat(decision: &ExtractedDecision, raw_text: Option<&str>) -> ChatReply {
    if decision.is_unavailable() {
        return offline_chat_reply();
    }

    let fields = decision.view();
    let prose = raw_text.map(str::trim).filter(|text| !text.is_empty());
    let response = match (fields.text("response"), prose) {
        (Some(response), _) => response,
        (None, Some(text)) if !decision.extraction_ok => text.to_string(),
        _ => return offline_chat_reply(),
    };

    ChatReply {
        response,
        suggestions: fields.strings("suggestions").unwrap_or_default(),
        action_data: fields
            .value("actionData")
            .cloned()
            .unwrap_or_else(|| json!({"type": "none"})),
    }
}

pub fn offline_chat_reply() -> ChatReply {
    ChatReply {
        response: OFFLINE_CHAT_REPLY.to_string(),
        suggestions: strings(&["Register a patient", "Submit a claim", "Review an EOB"]),
        action_data: json!({"type": "system_info", "status": "offline"}),
    }
}

/// A 0-100 score, rounded and clamped
pub(super) fn percent(value: Option<Decimal>) -> Option<u8> {
    value
        .map(|v| v.round().clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
        .and_then(|v| v.to_u8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{DecisionKind, ExtractionFailure};
    use serde_json::Value;

    fn parsed(kind: DecisionKind, value: Value) -> ExtractedDecision {
        ExtractedDecision::parsed(kind, value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_registration_fills_gaps_field_by_field() {
        let decision = parsed(
            DecisionKind::Registration,
            json!({"riskAssessment": {"riskLevel": "Low"}}),
        );
        let assessment = assess_registration(&decision);
        assert_eq!(assessment.risk_level, "Low");
        assert_eq!(assessment.insurance_eligibility, "Pending Review");
        assert_eq!(assessment.overall_quality, "Unknown");
    }

    #[test]
    fn test_denial_analysis_defaults_on_failure() {
        let decision = ExtractedDecision::failed(DecisionKind::DenialAnalysis, ExtractionFailure::NotAnObject);
        let analysis = analyze_denial(&decision, "Missing prior authorization");
        assert!(analysis.root_cause.contains("Missing prior authorization"));
        assert_eq!(analysis.priority, "Medium");
        assert!(!analysis.resolution_steps.is_empty());
    }

    #[test]
    fn test_refile_clamps_success_estimate() {
        let decision = parsed(
            DecisionKind::Refile,
            json!({"estimated_success": 140, "priority": "high"}),
        );
        let refile = recommend_refile(&decision, "Coding error");
        assert_eq!(refile.estimated_success, 100);
        assert_eq!(refile.priority, "high");
        assert_eq!(refile.timeline, "2-3 weeks");
        assert_eq!(refile.justification, "Claim refile recommended due to: Coding error");
    }

    #[test]
    fn test_chat_uses_prose_when_no_json() {
        let decision = ExtractedDecision::failed(DecisionKind::Chat, ExtractionFailure::NoObjectFound);
        let reply = reply_to_chat(&decision, Some("  Claims are reviewed within 3 days. "));
        assert_eq!(reply.response, "Claims are reviewed within 3 days.");
    }

    #[test]
    fn test_chat_offline_reply() {
        let reply = reply_to_chat(&ExtractedDecision::unavailable(DecisionKind::Chat), Some("ignored"));
        assert_eq!(reply.response, OFFLINE_CHAT_REPLY);
        assert_eq!(reply.action_type(), Some("system_info"));
        assert_eq!(reply.action_data["status"], "offline");
    }

    #[test]
    fn test_chat_structured_reply() {
        let decision = parsed(
            DecisionKind::Chat,
            json!({"response": "Claim CLM-1 is approved", "suggestions": ["View EOB"],
                   "actionData": {"type": "navigate", "target": "eob"}}),
        );
        let reply = reply_to_chat(&decision, None);
        assert_eq!(reply.response, "Claim CLM-1 is approved");
        assert_eq!(reply.action_type(), Some("navigate"));
    }
}
