//! Patient, claim and EOB workflows
//!
//! Every workflow decides first with no lock held, then takes the claim's
//! lock, re-reads the claim and commits. Side effects of a committed
//! transition run after the lock is released and cannot undo it.

use chrono::Utc;
use serde_json::Value;
use tracing::{info, instrument, warn};

use core_kernel::{ClaimId, EobId};
use domain_claims::adjudication::{self, SideEffect};
use domain_claims::{
    Claim, ClaimStatus, ClaimUpdate, Decision, DecisionKind, DecisionRequest, EobRecord, NewClaim,
    Patient, PatientRegistration, PolicyOutcome, RegistrationAssessment,
};

use crate::error::AdjudicationError;
use crate::orchestrator::Orchestrator;
use crate::outcome::{ClaimDecision, EobDecision, Outcome, PatientDecision};

fn wrong_record(kind: DecisionKind) -> AdjudicationError {
    AdjudicationError::Rejected(format!("{kind} decision produced an unexpected record"))
}

impl Orchestrator {
    /// Validates the form, assesses it and stores the patient
    #[instrument(skip(self, registration), fields(insurance_id = %registration.insurance_id))]
    pub async fn register_patient(
        &self,
        registration: PatientRegistration,
    ) -> Result<PatientDecision, AdjudicationError> {
        registration.check()?;
        let outcome = self.decide(&registration.to_request(), ClaimStatus::Pending).await?;
        let assessment = match &outcome.decision {
            Decision::Registration(assessment) => assessment.clone(),
            _ => RegistrationAssessment::default(),
        };

        let patient = Patient::register(registration, assessment);
        self.store.insert_patient(&patient).await?;
        info!(patient_id = %patient.id, "patient registered");
        Ok(PatientDecision { patient, outcome })
    }

    /// Opens a claim for a registered patient and adjudicates it
    #[instrument(skip(self, new_claim), fields(patient_id = %new_claim.patient_id))]
    pub async fn process_claim(&self, new_claim: NewClaim) -> Result<ClaimDecision, AdjudicationError> {
        let claim = Claim::submit(new_claim)?;
        self.store.get_patient(claim.patient_id).await?;
        self.store.insert_claim(&claim).await?;
        info!(claim_id = %claim.id, claim_number = %claim.claim_number, "claim submitted");

        self.adjudicate(claim).await
    }

    /// Amends a claim, resets it to `Pending` and adjudicates it again
    #[instrument(skip(self, update))]
    pub async fn readjudicate_claim(
        &self,
        claim_id: ClaimId,
        update: ClaimUpdate,
    ) -> Result<ClaimDecision, AdjudicationError> {
        let claim = {
            let _guard = self.locks.acquire(claim_id).await;
            let mut claim = self.store.get_claim(claim_id).await?;
            claim.amend(update)?;
            claim.apply(&adjudication::readjudication_reset(), Utc::now());
            self.store.update_claim(&claim).await?;
            claim
        };
        info!(claim_id = %claim_id, "claim reset for re-adjudication");

        self.adjudicate(claim).await
    }

    /// Operator approval
    #[instrument(skip(self))]
    pub async fn approve_claim(&self, claim_id: ClaimId) -> Result<ClaimDecision, AdjudicationError> {
        let _guard = self.locks.acquire(claim_id).await;
        let mut claim = self.store.get_claim(claim_id).await?;
        let transition = adjudication::operator_approval(claim.status())?;
        claim.apply(&transition, Utc::now());
        self.store.update_claim(&claim).await?;
        info!(claim_id = %claim_id, "claim approved by operator");

        Ok(ClaimDecision::committed(claim, None))
    }

    /// Operator denial; the denial is then analysed and the advice stored
    #[instrument(skip(self))]
    pub async fn deny_claim(&self, claim_id: ClaimId, reason: &str) -> Result<ClaimDecision, AdjudicationError> {
        let (claim, transition) = {
            let _guard = self.locks.acquire(claim_id).await;
            let mut claim = self.store.get_claim(claim_id).await?;
            let transition = adjudication::operator_denial(claim.status(), reason)?;
            claim.apply(&transition, Utc::now());
            self.store.update_claim(&claim).await?;
            (claim, transition)
        };
        info!(claim_id = %claim_id, "claim denied by operator");

        let mut result = ClaimDecision::committed(claim, None);
        self.follow_through(&mut result, &transition, false).await;
        Ok(result)
    }

    /// Improvement suggestions, stored on the claim
    #[instrument(skip(self))]
    pub async fn suggest_improvements(&self, claim_id: ClaimId) -> Result<ClaimDecision, AdjudicationError> {
        let claim = self.store.get_claim(claim_id).await?;
        let outcome = self.decide(&claim.suggestions_request(), claim.status()).await?;
        let claim = self.store_suggestions(claim_id, &outcome).await?;
        Ok(ClaimDecision::committed(claim, Some(outcome)))
    }

    /// Operator-requested EOB for any claim
    #[instrument(skip(self))]
    pub async fn generate_eob(&self, claim_id: ClaimId) -> Result<EobDecision, AdjudicationError> {
        let claim = self.store.get_claim(claim_id).await?;
        self.issue_eob(&claim).await
    }

    /// Reviews an EOB and folds the review into the record
    #[instrument(skip(self))]
    pub async fn analyze_eob(&self, eob_id: EobId) -> Result<EobDecision, AdjudicationError> {
        let eob = self.store.get_eob(eob_id).await?;
        let claim = self.store.get_claim(eob.claim_id).await?;
        let outcome = self
            .decide(&eob.analysis_request(Some(claim.claim_amount)), claim.status())
            .await?;
        let Decision::EobAnalysis(analysis) = &outcome.decision else {
            return Err(wrong_record(DecisionKind::EobAnalysis));
        };

        let _guard = self.locks.acquire(eob.claim_id).await;
        let mut eob = self.store.get_eob(eob_id).await?;
        eob.apply_analysis(analysis);
        self.store.update_eob(&eob).await?;
        info!(eob_id = %eob_id, refile_required = eob.refile_required, "EOB analysis stored");

        Ok(EobDecision {
            eob,
            outcome,
            claim: None,
        })
    }

    /// Recommends a refile and moves the EOB's claim to `Refiled`
    #[instrument(skip(self))]
    pub async fn refile(&self, eob_id: EobId, reason: &str) -> Result<EobDecision, AdjudicationError> {
        let eob = self.store.get_eob(eob_id).await?;
        let claim = self.store.get_claim(eob.claim_id).await?;
        let outcome = self.decide(&eob.refile_request(reason), claim.status()).await?;

        let claim = {
            let _guard = self.locks.acquire(eob.claim_id).await;
            let mut claim = self.store.get_claim(eob.claim_id).await?;
            let transition = adjudication::refile_transition(claim.status(), reason)?;
            claim.apply(&transition, Utc::now());
            self.store.update_claim(&claim).await?;
            claim
        };
        info!(claim_id = %claim.id, eob_id = %eob_id, "claim refiled");

        Ok(EobDecision {
            eob,
            outcome,
            claim: Some(claim),
        })
    }

    /// Assistant reply; never fails once the message is non-blank
    #[instrument(skip(self, message))]
    pub async fn chat(&self, message: &str) -> Result<Outcome, AdjudicationError> {
        let request = DecisionRequest::new(DecisionKind::Chat).with("message", message);
        self.decide(&request, ClaimStatus::Pending).await
    }

    async fn adjudicate(&self, claim: Claim) -> Result<ClaimDecision, AdjudicationError> {
        let outcome = self.decide(&claim.adjudication_request(), claim.status()).await?;
        let Some(transition) = outcome.transition.clone() else {
            return Err(wrong_record(DecisionKind::ClaimAdjudication));
        };

        let (claim, entering_approval) = {
            let _guard = self.locks.acquire(claim.id).await;
            let mut fresh = self.store.get_claim(claim.id).await?;
            let entering_approval = fresh.status() != ClaimStatus::Approved
                && transition.status() == ClaimStatus::Approved;
            fresh.apply(&transition, Utc::now());
            fresh.ai_analysis = Some(outcome.audit.clone());
            self.store.update_claim(&fresh).await?;
            (fresh, entering_approval)
        };
        info!(
            claim_id = %claim.id,
            status = %claim.status(),
            denial_reason = claim.denial_reason(),
            "claim decision committed"
        );

        let mut result = ClaimDecision::committed(claim, Some(outcome));
        self.follow_through(&mut result, &transition, entering_approval).await;
        Ok(result)
    }

    /// Runs the side effects of a committed transition
    async fn follow_through(
        &self,
        result: &mut ClaimDecision,
        transition: &PolicyOutcome,
        entering_approval: bool,
    ) {
        let claim_id = result.claim.id;

        if transition.triggers(SideEffect::QueueManualReview) {
            info!(claim_id = %claim_id, "claim queued for manual review");
        }

        if entering_approval && transition.triggers(SideEffect::GenerateEob) && self.config.auto_eob {
            match self.issue_eob(&result.claim).await {
                Ok(issued) => result.eob = Some(issued.eob),
                Err(err) => {
                    warn!(claim_id = %claim_id, error = %err, "EOB generation failed, approval kept");
                    result.eob_error = Some(err.to_string());
                }
            }
        }

        if transition.triggers(SideEffect::AnalyzeDenial) {
            let reason = result
                .claim
                .denial_reason()
                .unwrap_or(adjudication::GENERIC_DENIAL_REASON)
                .to_string();
            match self.analyze_denial(&result.claim, &reason).await {
                Ok((claim, outcome)) => {
                    result.claim = claim;
                    result.follow_up = Some(outcome);
                }
                Err(err) => warn!(claim_id = %claim_id, error = %err, "denial analysis not stored"),
            }
        }
    }

    async fn analyze_denial(&self, claim: &Claim, reason: &str) -> Result<(Claim, Outcome), AdjudicationError> {
        let outcome = self.decide(&claim.denial_request(reason), claim.status()).await?;
        let claim = self.store_suggestions(claim.id, &outcome).await?;
        Ok((claim, outcome))
    }

    async fn store_suggestions(&self, claim_id: ClaimId, outcome: &Outcome) -> Result<Claim, AdjudicationError> {
        let _guard = self.locks.acquire(claim_id).await;
        let mut claim = self.store.get_claim(claim_id).await?;
        claim.ai_suggestions = Some(Value::Object(outcome.decision.to_record()));
        claim.updated_at = Utc::now();
        self.store.update_claim(&claim).await?;
        Ok(claim)
    }

    async fn issue_eob(&self, claim: &Claim) -> Result<EobDecision, AdjudicationError> {
        let outcome = self.decide(&claim.eob_request(), claim.status()).await?;
        let Decision::EobGeneration(draft) = &outcome.decision else {
            return Err(wrong_record(DecisionKind::EobGeneration));
        };

        let eob = EobRecord::issue(claim, draft);
        self.store.insert_eob(&eob).await?;
        info!(
            claim_id = %claim.id,
            eob_id = %eob.id,
            amount = %eob.amount,
            status = %eob.status,
            degraded = draft.degraded,
            "EOB issued"
        );

        Ok(EobDecision {
            eob,
            outcome,
            claim: None,
        })
    }
}
