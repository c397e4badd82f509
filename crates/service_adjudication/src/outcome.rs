//! Decision outcomes and workflow results

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use domain_claims::{
    Claim, ClaimStatus, Decision, DecisionKind, EobRecord, ExtractedDecision, ExtractionFailure,
    Patient, PolicyOutcome, SideEffect,
};
use infra_ai::TransportUsed;

/// Everything one decision produced
///
/// `decision` is always complete: any field the model did not supply has
/// already been replaced by its default. `audit` is the raw extracted
/// object, empty when extraction failed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub kind: DecisionKind,
    pub decision: Decision,
    /// Claim transition, for the kinds that move a claim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition: Option<PolicyOutcome>,
    pub audit: Map<String, Value>,
    pub extraction_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ExtractionFailure>,
    /// `None` when both transports failed
    pub transport_used: Option<TransportUsed>,
    pub latency_ms: u64,
}

impl Outcome {
    pub(crate) fn new(
        extracted: ExtractedDecision,
        decision: Decision,
        transition: Option<PolicyOutcome>,
        transport_used: Option<TransportUsed>,
        latency: Duration,
    ) -> Self {
        Self {
            kind: extracted.kind,
            decision,
            transition,
            audit: extracted.fields,
            extraction_ok: extracted.extraction_ok,
            failure: extracted.failure,
            transport_used,
            latency_ms: latency.as_millis() as u64,
        }
    }

    /// New claim status, if this decision moves a claim
    pub fn status(&self) -> Option<ClaimStatus> {
        self.transition.as_ref().map(PolicyOutcome::status)
    }

    pub fn triggers(&self, effect: SideEffect) -> bool {
        self.transition
            .as_ref()
            .is_some_and(|transition| transition.triggers(effect))
    }

    /// False when the decision is the offline stand-in
    pub fn inference_available(&self) -> bool {
        self.failure != Some(ExtractionFailure::InferenceUnavailable)
    }
}

/// A newly registered patient
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDecision {
    pub patient: Patient,
    pub outcome: Outcome,
}

/// A claim after a workflow committed to it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDecision {
    pub claim: Claim,
    /// The inference-backed decision, absent for pure operator moves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// Denial analysis run after the claim was denied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eob: Option<EobRecord>,
    /// Why the automatic EOB could not be issued; the approval stands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eob_error: Option<String>,
}

impl ClaimDecision {
    pub(crate) fn committed(claim: Claim, outcome: Option<Outcome>) -> Self {
        Self {
            claim,
            outcome,
            follow_up: None,
            eob: None,
            eob_error: None,
        }
    }
}

/// An EOB after a workflow wrote it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EobDecision {
    pub eob: EobRecord,
    pub outcome: Outcome,
    /// The claim, when the workflow moved it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim: Option<Claim>,
}
