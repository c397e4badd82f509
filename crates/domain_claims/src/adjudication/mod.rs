//! Adjudication policy
//!
//! Pure functions, one per decision kind, that turn an `ExtractedDecision`
//! into a typed record and, where the kind affects a claim, a
//! [`PolicyOutcome`]. This module is the only place a `ClaimStatus` is
//! chosen; `Claim::apply` merely commits what it returns.
//!
//! # Claim adjudication
//!
//! Three signals vote (fraud recommendation, coverage decision,
//! validation status):
//!
//! ```text
//! any Veto           -> Denied
//! all three Affirm   -> Approved
//! otherwise          -> PendingApproval
//! no parsed decision -> PendingApproval
//! ```

mod advisory;
mod eob;
mod signals;

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::assessment::ClaimAssessment;
use crate::claim::ClaimStatus;
use crate::decision::{DecisionKind, ExtractedDecision};
use crate::error::ClaimError;

pub use advisory::{
    analyze_denial, assess_registration, offline_chat_reply, recommend_refile, reply_to_chat,
    suggest_improvements, OFFLINE_CHAT_REPLY,
};
pub use eob::{analyze_eob, draft_eob, DEFAULT_COVERAGE_PERCENT, DEFAULT_PAYER};
pub use signals::{ClaimSignals, CoverageDecision, FraudRecommendation, ValidationStatus, Vote};

/// Denial reason used when the model gave no specific one
pub const GENERIC_DENIAL_REASON: &str = "AI analysis indicates denial";

/// Work the orchestrator must carry out after committing an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    /// Issue an EOB for the newly approved claim
    GenerateEob,
    /// Put the claim in front of an operator
    QueueManualReview,
    /// Run denial analysis for the recorded reason
    AnalyzeDenial,
}

/// A claim state transition chosen by the policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyOutcome {
    status: ClaimStatus,
    denial_reason: Option<String>,
    side_effects: BTreeSet<SideEffect>,
    ambiguities: Vec<String>,
}

impl PolicyOutcome {
    pub(crate) fn to(status: ClaimStatus) -> Self {
        Self {
            status,
            denial_reason: None,
            side_effects: BTreeSet::new(),
            ambiguities: Vec::new(),
        }
    }

    pub(crate) fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.denial_reason = Some(reason.into());
        self
    }

    pub(crate) fn with_effect(mut self, effect: SideEffect) -> Self {
        self.side_effects.insert(effect);
        self
    }

    pub(crate) fn with_ambiguities(mut self, notes: Vec<String>) -> Self {
        self.ambiguities.extend(notes);
        self
    }

    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    pub fn denial_reason(&self) -> Option<&str> {
        self.denial_reason.as_deref()
    }

    pub fn side_effects(&self) -> &BTreeSet<SideEffect> {
        &self.side_effects
    }

    pub fn triggers(&self, effect: SideEffect) -> bool {
        self.side_effects.contains(&effect)
    }

    /// Signals the policy could not read and resolved conservatively
    pub fn ambiguities(&self) -> &[String] {
        &self.ambiguities
    }
}

/// Decides a claim from the model's three signals
pub fn adjudicate_claim(
    decision: &ExtractedDecision,
    current: ClaimStatus,
) -> (ClaimAssessment, PolicyOutcome) {
    let fields = decision.view();
    let assessment = ClaimAssessment {
        fraud_recommendation: fields
            .text(signals::FRAUD_RECOMMENDATION_PATH)
            .unwrap_or_else(|| crate::assessment::UNKNOWN.to_string()),
        coverage_decision: fields
            .text(signals::COVERAGE_DECISION_PATH)
            .unwrap_or_else(|| crate::assessment::UNKNOWN.to_string()),
        validation_status: fields
            .text(signals::VALIDATION_STATUS_PATH)
            .unwrap_or_else(|| crate::assessment::UNKNOWN.to_string()),
        risk_level: fields
            .text("fraudRiskAssessment.riskLevel")
            .unwrap_or_else(|| crate::assessment::UNKNOWN.to_string()),
        risk_factors: fields.strings("fraudRiskAssessment.riskFactors").unwrap_or_default(),
        validation_issues: fields.strings("validation.issues").unwrap_or_default(),
        required_documents: fields
            .strings("approvalRequirements.requiredDocuments")
            .unwrap_or_default(),
        next_steps: fields.strings("nextSteps").unwrap_or_default(),
    };

    if decision.kind != DecisionKind::ClaimAdjudication {
        let note = format!("expected a claim adjudication decision, got {}", decision.kind);
        warn!(kind = %decision.kind, "policy conflict: {note}");
        return (assessment, held_for_review(vec![note]));
    }

    if !decision.extraction_ok {
        let note = match &decision.failure {
            Some(failure) => format!("no usable decision: {failure}"),
            None => "no usable decision".to_string(),
        };
        warn!(current = %current, "claim held for review: {note}");
        return (assessment, held_for_review(vec![note]));
    }

    let signals = ClaimSignals::read(&fields);
    let votes = signals.votes();
    let ambiguities = signals.ambiguities();
    for note in &ambiguities {
        warn!(current = %current, "policy conflict: {note}");
    }

    let outcome = if votes.contains(&Vote::Veto) {
        if votes.contains(&Vote::Affirm) {
            debug!(?votes, "mixed signals resolved to denial by veto");
        }
        PolicyOutcome::to(ClaimStatus::Denied)
            .with_reason(denial_reason(&assessment))
            .with_effect(SideEffect::AnalyzeDenial)
            .with_ambiguities(ambiguities)
    } else if votes.iter().all(|vote| *vote == Vote::Affirm) {
        let outcome = PolicyOutcome::to(ClaimStatus::Approved);
        if current == ClaimStatus::Approved {
            outcome
        } else {
            outcome.with_effect(SideEffect::GenerateEob)
        }
    } else {
        held_for_review(ambiguities)
    };

    (assessment, outcome)
}

fn held_for_review(ambiguities: Vec<String>) -> PolicyOutcome {
    PolicyOutcome::to(ClaimStatus::PendingApproval)
        .with_effect(SideEffect::QueueManualReview)
        .with_ambiguities(ambiguities)
}

/// First validation issue, else first fraud risk factor, else generic text
fn denial_reason(assessment: &ClaimAssessment) -> String {
    assessment
        .validation_issues
        .first()
        .or_else(|| assessment.risk_factors.first())
        .cloned()
        .unwrap_or_else(|| GENERIC_DENIAL_REASON.to_string())
}

/// Returns a claim to `Pending` before it is decided again
pub fn readjudication_reset() -> PolicyOutcome {
    PolicyOutcome::to(ClaimStatus::Pending)
}

/// Operator approves a claim
pub fn operator_approval(current: ClaimStatus) -> Result<PolicyOutcome, ClaimError> {
    match current {
        ClaimStatus::Approved => Err(ClaimError::InvalidStatusTransition {
            from: current.to_string(),
            to: ClaimStatus::Approved.to_string(),
        }),
        _ => Ok(PolicyOutcome::to(ClaimStatus::Approved)),
    }
}

/// Operator denies a claim with a reason
pub fn operator_denial(current: ClaimStatus, reason: &str) -> Result<PolicyOutcome, ClaimError> {
    if current == ClaimStatus::Denied {
        return Err(ClaimError::InvalidStatusTransition {
            from: current.to_string(),
            to: ClaimStatus::Denied.to_string(),
        });
    }
    let reason = reason.trim();
    let reason = if reason.is_empty() { GENERIC_DENIAL_REASON } else { reason };
    Ok(PolicyOutcome::to(ClaimStatus::Denied)
        .with_reason(reason)
        .with_effect(SideEffect::AnalyzeDenial))
}

/// A refile moves the claim to `Refiled` and keeps the reason for audit
pub fn refile_transition(current: ClaimStatus, reason: &str) -> Result<PolicyOutcome, ClaimError> {
    if current == ClaimStatus::Pending {
        return Err(ClaimError::InvalidStatusTransition {
            from: current.to_string(),
            to: ClaimStatus::Refiled.to_string(),
        });
    }
    Ok(PolicyOutcome::to(ClaimStatus::Refiled).with_reason(reason.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::ExtractionFailure;
    use serde_json::{json, Value};

    fn claim_decision(value: Value) -> ExtractedDecision {
        ExtractedDecision::parsed(
            DecisionKind::ClaimAdjudication,
            value.as_object().cloned().unwrap(),
        )
    }

    fn signals(fraud: &str, coverage: &str, validation: &str) -> ExtractedDecision {
        claim_decision(json!({
            "fraudRiskAssessment": {"recommendation": fraud, "riskFactors": []},
            "coverageCheck": {"coverageDecision": coverage},
            "validation": {"status": validation, "issues": []}
        }))
    }

    #[test]
    fn test_unanimous_approval_generates_eob() {
        let (_, outcome) = adjudicate_claim(&signals("Approve", "Approved", "Valid"), ClaimStatus::Pending);
        assert_eq!(outcome.status(), ClaimStatus::Approved);
        assert!(outcome.triggers(SideEffect::GenerateEob));
        assert!(outcome.denial_reason().is_none());
        assert!(outcome.ambiguities().is_empty());
    }

    #[test]
    fn test_reapproval_does_not_generate_second_eob() {
        let (_, outcome) = adjudicate_claim(&signals("Approve", "Approved", "Valid"), ClaimStatus::Approved);
        assert_eq!(outcome.status(), ClaimStatus::Approved);
        assert!(!outcome.triggers(SideEffect::GenerateEob));
    }

    #[test]
    fn test_single_veto_denies() {
        let (_, outcome) = adjudicate_claim(&signals("Deny", "Approved", "Valid"), ClaimStatus::Pending);
        assert_eq!(outcome.status(), ClaimStatus::Denied);
        assert_eq!(outcome.denial_reason(), Some(GENERIC_DENIAL_REASON));
        assert!(outcome.triggers(SideEffect::AnalyzeDenial));
    }

    #[test]
    fn test_pending_signal_holds_for_review() {
        let (_, outcome) = adjudicate_claim(&signals("Approve", "Pending Review", "Valid"), ClaimStatus::Pending);
        assert_eq!(outcome.status(), ClaimStatus::PendingApproval);
        assert!(outcome.triggers(SideEffect::QueueManualReview));
    }

    #[test]
    fn test_denial_reason_precedence() {
        let decision = claim_decision(json!({
            "fraudRiskAssessment": {"recommendation": "Deny", "riskFactors": ["Duplicate billing"]},
            "coverageCheck": {"coverageDecision": "Denied"},
            "validation": {"status": "Invalid", "issues": ["Missing CPT code"]}
        }));
        let (_, outcome) = adjudicate_claim(&decision, ClaimStatus::Pending);
        assert_eq!(outcome.denial_reason(), Some("Missing CPT code"));

        let decision = claim_decision(json!({
            "fraudRiskAssessment": {"recommendation": "Deny", "riskFactors": ["Duplicate billing"]},
            "coverageCheck": {"coverageDecision": "Approved"},
            "validation": {"status": "Valid"}
        }));
        let (_, outcome) = adjudicate_claim(&decision, ClaimStatus::Pending);
        assert_eq!(outcome.denial_reason(), Some("Duplicate billing"));
    }

    #[test]
    fn test_failed_extraction_never_decides() {
        let decision = ExtractedDecision::failed(
            DecisionKind::ClaimAdjudication,
            ExtractionFailure::NoObjectFound,
        );
        let (assessment, outcome) = adjudicate_claim(&decision, ClaimStatus::Pending);
        assert_eq!(outcome.status(), ClaimStatus::PendingApproval);
        assert_eq!(assessment.fraud_recommendation, crate::assessment::UNKNOWN);
        assert!(!outcome.ambiguities().is_empty());
    }

    #[test]
    fn test_unrecognized_signal_is_recorded() {
        let (_, outcome) = adjudicate_claim(&signals("Approve", "Approved", "Looks fine"), ClaimStatus::Pending);
        assert_eq!(outcome.status(), ClaimStatus::PendingApproval);
        assert_eq!(outcome.ambiguities().len(), 1);
    }

    #[test]
    fn test_wrong_kind_is_held() {
        let decision = ExtractedDecision::parsed(DecisionKind::Chat, Default::default());
        let (_, outcome) = adjudicate_claim(&decision, ClaimStatus::Pending);
        assert_eq!(outcome.status(), ClaimStatus::PendingApproval);
    }

    #[test]
    fn test_operator_transitions() {
        assert_eq!(
            operator_approval(ClaimStatus::PendingApproval).unwrap().status(),
            ClaimStatus::Approved
        );
        assert!(operator_approval(ClaimStatus::Approved).is_err());

        let denial = operator_denial(ClaimStatus::PendingApproval, "  ").unwrap();
        assert_eq!(denial.denial_reason(), Some(GENERIC_DENIAL_REASON));
        assert!(operator_denial(ClaimStatus::Denied, "again").is_err());
    }

    #[test]
    fn test_refile_requires_a_prior_decision() {
        let outcome = refile_transition(ClaimStatus::Denied, "Corrected billing code").unwrap();
        assert_eq!(outcome.status(), ClaimStatus::Refiled);
        assert_eq!(outcome.denial_reason(), Some("Corrected billing code"));
        assert!(refile_transition(ClaimStatus::Pending, "x").is_err());
    }
}
