//! Claim aggregate
//!
//! The claim's lifecycle fields (`status`, the approval/denial timestamps and
//! `denial_reason`) are private. They change only through [`Claim::apply`],
//! which takes a [`PolicyOutcome`] produced by the adjudication policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use core_kernel::{ClaimId, Money, PatientId};
use crate::adjudication::PolicyOutcome;
use crate::decision::{DecisionKind, DecisionRequest};
use crate::error::ClaimError;

/// Claim lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Submitted, no decision yet
    Pending,
    /// Waiting for an operator
    PendingApproval,
    Approved,
    Denied,
    /// Resubmitted after an EOB review
    Refiled,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::PendingApproval => "pending_approval",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Denied => "denied",
            ClaimStatus::Refiled => "refiled",
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data needed to open a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClaim {
    pub patient_id: PatientId,
    pub claim_amount: Money,
    pub claim_type: String,
    pub description: String,
}

impl NewClaim {
    pub fn validate(&self) -> Result<(), ClaimError> {
        if self.claim_amount.is_negative() || self.claim_amount.is_zero() {
            return Err(ClaimError::InvalidAmount(self.claim_amount.to_string()));
        }
        Ok(())
    }
}

/// Changes to a claim that force re-adjudication
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimUpdate {
    pub claim_amount: Option<Money>,
    pub claim_type: Option<String>,
    pub description: Option<String>,
}

/// A healthcare claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub claim_number: String,
    pub patient_id: PatientId,
    pub claim_amount: Money,
    pub claim_type: String,
    pub description: String,
    status: ClaimStatus,
    /// True while the claim waits for an operator
    pub approval_required: bool,
    approved_at: Option<DateTime<Utc>>,
    denied_at: Option<DateTime<Utc>>,
    denial_reason: Option<String>,
    /// Fields of the last adjudication decision, kept verbatim
    pub ai_analysis: Option<Map<String, Value>>,
    /// Last advisory suggestion object (denial analysis or suggestions)
    pub ai_suggestions: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Opens a claim in `Pending`
    pub fn submit(new_claim: NewClaim) -> Result<Self, ClaimError> {
        new_claim.validate()?;
        let now = Utc::now();
        let id = ClaimId::new();

        Ok(Self {
            claim_number: format!("CLM-{}", id.short()),
            id,
            patient_id: new_claim.patient_id,
            claim_amount: new_claim.claim_amount,
            claim_type: new_claim.claim_type,
            description: new_claim.description,
            status: ClaimStatus::Pending,
            approval_required: false,
            approved_at: None,
            denied_at: None,
            denial_reason: None,
            ai_analysis: None,
            ai_suggestions: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    pub fn denied_at(&self) -> Option<DateTime<Utc>> {
        self.denied_at
    }

    pub fn denial_reason(&self) -> Option<&str> {
        self.denial_reason.as_deref()
    }

    /// Commits a policy outcome to the lifecycle fields
    pub fn apply(&mut self, outcome: &PolicyOutcome, at: DateTime<Utc>) {
        self.status = outcome.status();
        self.denial_reason = outcome.denial_reason().map(str::to_string);
        match self.status {
            ClaimStatus::Approved => {
                self.approved_at = Some(at);
                self.denied_at = None;
            }
            ClaimStatus::Denied => {
                self.denied_at = Some(at);
                self.approved_at = None;
            }
            ClaimStatus::Pending | ClaimStatus::PendingApproval | ClaimStatus::Refiled => {
                self.approved_at = None;
                self.denied_at = None;
            }
        }
        self.approval_required = self.status == ClaimStatus::PendingApproval;
        self.updated_at = at;
    }

    /// Applies edits; the caller must reset and re-adjudicate afterwards
    pub fn amend(&mut self, update: ClaimUpdate) -> Result<(), ClaimError> {
        if let Some(amount) = update.claim_amount {
            if amount.is_negative() || amount.is_zero() {
                return Err(ClaimError::InvalidAmount(amount.to_string()));
            }
            self.claim_amount = amount;
        }
        if let Some(claim_type) = update.claim_type {
            self.claim_type = claim_type;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Status and timestamp pair agree
    pub fn is_consistent(&self) -> bool {
        match self.status {
            ClaimStatus::Approved => self.approved_at.is_some() && self.denied_at.is_none(),
            ClaimStatus::Denied => self.denied_at.is_some() && self.approved_at.is_none(),
            _ => self.approved_at.is_none() && self.denied_at.is_none(),
        }
    }

    pub fn adjudication_request(&self) -> DecisionRequest {
        DecisionRequest::new(DecisionKind::ClaimAdjudication)
            .with("patient_id", self.patient_id.to_string())
            .with("claim_amount", self.claim_amount)
            .with("claim_type", self.claim_type.as_str())
            .with("description", self.description.as_str())
    }

    pub fn eob_request(&self) -> DecisionRequest {
        DecisionRequest::new(DecisionKind::EobGeneration)
            .with("claim_id", self.id.to_string())
            .with("patient_id", self.patient_id.to_string())
            .with("claim_amount", self.claim_amount)
            .with("claim_type", self.claim_type.as_str())
            .with("description", self.description.as_str())
            .with("claim_status", self.status.as_str())
            .with("currency", self.claim_amount.currency().code())
    }

    pub fn denial_request(&self, reason: &str) -> DecisionRequest {
        DecisionRequest::new(DecisionKind::DenialAnalysis)
            .with("claim_id", self.id.to_string())
            .with("denial_reason", reason)
    }

    pub fn suggestions_request(&self) -> DecisionRequest {
        let prior = self
            .ai_analysis
            .as_ref()
            .map(|analysis| Value::Object(analysis.clone()).to_string());
        DecisionRequest::new(DecisionKind::ClaimSuggestions)
            .with("claim_id", self.id.to_string())
            .with("claim_amount", self.claim_amount)
            .with("claim_type", self.claim_type.as_str())
            .with("description", self.description.as_str())
            .with("claim_status", self.status.as_str())
            .with("approval_required", self.approval_required)
            .with_opt("prior_analysis", prior)
    }
}
