//! Adjudication orchestrator
//!
//! `decide` runs one decision end to end:
//!
//! ```text
//! PolicyInputs::read -> prompt::build -> gateway.invoke -> extractor::extract -> policy
//! ```
//!
//! It has no side effects. The workflows in [`crate::workflows`] call it and
//! then commit the result under the claim's lock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use domain_claims::{ClaimStatus, ClaimsStore, DecisionKind, DecisionRequest, ExtractedDecision};
use infra_ai::{extractor, prompt, InferenceConfig, InferenceGateway, TransportError, TransportUsed};

use crate::config::OrchestratorConfig;
use crate::error::AdjudicationError;
use crate::inputs::PolicyInputs;
use crate::locks::ClaimLocks;
use crate::outcome::Outcome;

/// What came back from the inference layer for one request
struct Consultation {
    extracted: ExtractedDecision,
    raw_text: Option<String>,
    transport_used: Option<TransportUsed>,
    latency: Duration,
}

pub struct Orchestrator {
    reasoning: Arc<InferenceGateway>,
    delegation: Arc<InferenceGateway>,
    pub(crate) store: Arc<dyn ClaimsStore>,
    pub(crate) locks: ClaimLocks,
    pub(crate) config: OrchestratorConfig,
}

impl Orchestrator {
    /// `reasoning` serves registration and claim adjudication; every other
    /// kind goes to `delegation`
    pub fn new(
        reasoning: Arc<InferenceGateway>,
        delegation: Arc<InferenceGateway>,
        store: Arc<dyn ClaimsStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            reasoning,
            delegation,
            store,
            locks: ClaimLocks::new(),
            config,
        }
    }

    /// Builds both gateways from configuration
    pub fn from_config(
        inference: &InferenceConfig,
        store: Arc<dyn ClaimsStore>,
        config: OrchestratorConfig,
    ) -> Result<Self, TransportError> {
        Ok(Self::new(
            Arc::new(InferenceGateway::reasoning(inference)?),
            Arc::new(InferenceGateway::delegation(inference)?),
            store,
            config,
        ))
    }

    fn gateway_for(&self, kind: DecisionKind) -> &InferenceGateway {
        match kind {
            DecisionKind::Registration | DecisionKind::ClaimAdjudication => &self.reasoning,
            _ => &self.delegation,
        }
    }

    /// Runs one decision without committing anything
    ///
    /// Fails only for a malformed request or a transition the policy forbids
    /// up front. An unreachable inference service or an unreadable answer
    /// still yields an `Outcome`: advisory kinds get their defaults and a
    /// claim adjudication is held at `PendingApproval`.
    #[instrument(skip(self, request), fields(kind = %request.kind, current = %current))]
    pub async fn decide(
        &self,
        request: &DecisionRequest,
        current: ClaimStatus,
    ) -> Result<Outcome, AdjudicationError> {
        let inputs = PolicyInputs::read(request, current)?;
        let consultation = self.consult(request).await;

        let (decision, transition) =
            inputs.apply(&consultation.extracted, consultation.raw_text.as_deref());
        if let Some(transition) = &transition {
            info!(
                status = %transition.status(),
                effects = ?transition.side_effects(),
                extraction_ok = consultation.extracted.extraction_ok,
                "policy decided"
            );
        }

        Ok(Outcome::new(
            consultation.extracted,
            decision,
            transition,
            consultation.transport_used,
            consultation.latency,
        ))
    }

    async fn consult(&self, request: &DecisionRequest) -> Consultation {
        let prompt = prompt::build(request);
        let started = Instant::now();
        match self.gateway_for(request.kind).invoke(&prompt).await {
            Ok(raw) => Consultation {
                extracted: extractor::extract(request.kind, &raw.text),
                transport_used: Some(raw.transport_used),
                latency: raw.latency,
                raw_text: Some(raw.text),
            },
            Err(err) => {
                if request.kind.is_advisory() {
                    info!(kind = %request.kind, "inference offline, using default decision");
                } else {
                    warn!(kind = %request.kind, error = %err, "inference offline, decision degraded");
                }
                Consultation {
                    extracted: ExtractedDecision::unavailable(request.kind),
                    raw_text: None,
                    transport_used: None,
                    latency: started.elapsed(),
                }
            }
        }
    }
}
