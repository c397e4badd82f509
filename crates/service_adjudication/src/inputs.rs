//! Policy inputs read from a request before any inference call
//!
//! Everything a policy function needs beyond the model's answer is parsed
//! and checked up front, so a malformed request is rejected without spending
//! an inference call on it.

use chrono::Utc;

use core_kernel::Money;
use domain_claims::adjudication::{self, refile_transition};
use domain_claims::eob::split_denial_reasons;
use domain_claims::{
    ClaimStatus, Decision, DecisionKind, DecisionRequest, EobStatus, ExtractedDecision, PolicyOutcome,
};

use crate::error::AdjudicationError;

#[derive(Debug, Clone)]
pub(crate) enum PolicyInputs {
    Registration,
    ClaimAdjudication {
        current: ClaimStatus,
    },
    DenialAnalysis {
        reason: String,
    },
    EobGeneration {
        claim_amount: Money,
    },
    EobAnalysis {
        status: EobStatus,
        amount: Money,
        recorded_reasons: Vec<String>,
    },
    Refile {
        reason: String,
        transition: PolicyOutcome,
    },
    ClaimSuggestions,
    Chat,
}

impl PolicyInputs {
    pub(crate) fn read(request: &DecisionRequest, current: ClaimStatus) -> Result<Self, AdjudicationError> {
        request.validate()?;

        Ok(match request.kind {
            DecisionKind::Registration => PolicyInputs::Registration,
            DecisionKind::ClaimAdjudication => PolicyInputs::ClaimAdjudication { current },
            DecisionKind::DenialAnalysis => PolicyInputs::DenialAnalysis {
                reason: request.text("denial_reason").unwrap_or_default(),
            },
            DecisionKind::EobGeneration => PolicyInputs::EobGeneration {
                claim_amount: amount(request, "claim_amount")?,
            },
            DecisionKind::EobAnalysis => PolicyInputs::EobAnalysis {
                status: request
                    .text("eob_status")
                    .and_then(|status| EobStatus::parse(&status))
                    .unwrap_or(EobStatus::Pending),
                amount: amount(request, "eob_amount")?,
                recorded_reasons: request
                    .text("denial_reasons")
                    .map(|joined| split_denial_reasons(&joined))
                    .unwrap_or_default(),
            },
            DecisionKind::Refile => {
                let reason = request.text("refile_reason").unwrap_or_default();
                PolicyInputs::Refile {
                    transition: refile_transition(current, &reason)?,
                    reason,
                }
            }
            DecisionKind::ClaimSuggestions => PolicyInputs::ClaimSuggestions,
            DecisionKind::Chat => PolicyInputs::Chat,
        })
    }

    /// Runs the policy for this kind over the extracted decision
    pub(crate) fn apply(
        self,
        extracted: &ExtractedDecision,
        raw_text: Option<&str>,
    ) -> (Decision, Option<PolicyOutcome>) {
        match self {
            PolicyInputs::Registration => (
                Decision::Registration(adjudication::assess_registration(extracted)),
                None,
            ),
            PolicyInputs::ClaimAdjudication { current } => {
                let (assessment, transition) = adjudication::adjudicate_claim(extracted, current);
                (Decision::ClaimAdjudication(assessment), Some(transition))
            }
            PolicyInputs::DenialAnalysis { reason } => (
                Decision::DenialAnalysis(adjudication::analyze_denial(extracted, &reason)),
                None,
            ),
            PolicyInputs::EobGeneration { claim_amount } => (
                Decision::EobGeneration(adjudication::draft_eob(
                    extracted,
                    claim_amount,
                    Utc::now().date_naive(),
                )),
                None,
            ),
            PolicyInputs::EobAnalysis {
                status,
                amount,
                recorded_reasons,
            } => (
                Decision::EobAnalysis(adjudication::analyze_eob(
                    extracted,
                    status,
                    amount,
                    &recorded_reasons,
                )),
                None,
            ),
            PolicyInputs::Refile { reason, transition } => (
                Decision::Refile(adjudication::recommend_refile(extracted, &reason)),
                Some(transition),
            ),
            PolicyInputs::ClaimSuggestions => (
                Decision::ClaimSuggestions(adjudication::suggest_improvements(extracted)),
                None,
            ),
            PolicyInputs::Chat => (
                Decision::Chat(adjudication::reply_to_chat(extracted, raw_text)),
                None,
            ),
        }
    }
}

fn amount(request: &DecisionRequest, key: &str) -> Result<Money, AdjudicationError> {
    request.money(key).ok_or_else(|| {
        AdjudicationError::MalformedRequest(format!(
            "'{key}' is not an amount for {} decision",
            request.kind
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_field_is_rejected_before_inference() {
        let request = DecisionRequest::new(DecisionKind::EobGeneration).with("claim_id", "CLM-1");
        let err = PolicyInputs::read(&request, ClaimStatus::Approved).unwrap_err();
        assert!(matches!(err, AdjudicationError::MalformedRequest(_)));
    }

    #[test]
    fn test_amount_honours_currency() {
        let request = DecisionRequest::new(DecisionKind::EobGeneration)
            .with("claim_id", "CLM-1")
            .with("patient_id", "PAT-1")
            .with("claim_amount", "to be confirmed")
            .with("claim_type", "Inpatient")
            .with("currency", "eur");
        assert!(PolicyInputs::read(&request, ClaimStatus::Approved).is_err());

        let request = request.with("claim_amount", dec!(1250));
        match PolicyInputs::read(&request, ClaimStatus::Approved).unwrap() {
            PolicyInputs::EobGeneration { claim_amount } => {
                assert_eq!(claim_amount, Money::new(dec!(1250), Currency::EUR));
            }
            other => panic!("unexpected inputs: {other:?}"),
        }
    }

    #[test]
    fn test_refile_of_pending_claim_is_rejected() {
        let request = DecisionRequest::new(DecisionKind::Refile)
            .with("eob_status", "denied")
            .with("payer", "Acme Health")
            .with("refile_reason", "Corrected CPT code");
        let err = PolicyInputs::read(&request, ClaimStatus::Pending).unwrap_err();
        assert!(matches!(err, AdjudicationError::Rejected(_)));
        assert!(PolicyInputs::read(&request, ClaimStatus::Denied).is_ok());
    }
}
