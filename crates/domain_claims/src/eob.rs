//! Explanation of benefits

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use core_kernel::{ClaimId, EobId, Money, PatientId};
use crate::assessment::{EobAnalysis, EobDraft};
use crate::claim::Claim;
use crate::decision::{DecisionKind, DecisionRequest};

/// Joins denial reasons when they travel as a single context value
pub const DENIAL_REASON_SEPARATOR: &str = "; ";

/// Inverse of the joined form used in decision requests
pub fn split_denial_reasons(joined: &str) -> Vec<String> {
    joined
        .split(DENIAL_REASON_SEPARATOR.trim())
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .map(str::to_string)
        .collect()
}

/// Payer's verdict on the claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EobStatus {
    Approved,
    Denied,
    Partial,
    Pending,
}

impl EobStatus {
    /// Reads a status the way models phrase it
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "approved" | "approve" | "paid" | "covered" => Some(EobStatus::Approved),
            "denied" | "deny" | "rejected" => Some(EobStatus::Denied),
            "partial" | "partially approved" | "partially_approved" => Some(EobStatus::Partial),
            "pending" | "pending review" | "in review" => Some(EobStatus::Pending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EobStatus::Approved => "approved",
            EobStatus::Denied => "denied",
            EobStatus::Partial => "partial",
            EobStatus::Pending => "pending",
        }
    }
}

impl std::fmt::Display for EobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An issued EOB, many per claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EobRecord {
    pub id: EobId,
    pub claim_id: ClaimId,
    pub patient_id: PatientId,
    pub amount: Money,
    pub status: EobStatus,
    pub eob_date: NaiveDate,
    pub payer: String,
    pub ai_analysis: Option<Value>,
    pub denial_reasons: Vec<String>,
    pub refile_required: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EobRecord {
    pub fn issue(claim: &Claim, draft: &EobDraft) -> Self {
        let now = Utc::now();
        Self {
            id: EobId::new(),
            claim_id: claim.id,
            patient_id: claim.patient_id,
            amount: draft.amount,
            status: draft.status,
            eob_date: draft.eob_date,
            payer: draft.payer.clone(),
            ai_analysis: Some(draft.to_value()),
            denial_reasons: draft.denial_reasons.clone(),
            refile_required: draft.refile_required,
            created_at: now,
            updated_at: now,
        }
    }

    /// Folds an analysis into the record in place
    pub fn apply_analysis(&mut self, analysis: &EobAnalysis) {
        self.denial_reasons = analysis.denial_reasons.clone();
        self.refile_required = analysis.refile_required;
        self.ai_analysis = serde_json::to_value(analysis).ok();
        self.updated_at = Utc::now();
    }

    pub fn analysis_request(&self, claim_amount: Option<Money>) -> DecisionRequest {
        DecisionRequest::new(DecisionKind::EobAnalysis)
            .with("eob_id", self.id.to_string())
            .with("eob_amount", self.amount)
            .with("eob_status", self.status.as_str())
            .with("payer", self.payer.as_str())
            .with("eob_date", self.eob_date.format("%Y-%m-%d").to_string())
            .with_opt("claim_amount", claim_amount)
            .with_opt("denial_reasons", self.joined_denial_reasons())
            .with("currency", self.amount.currency().code())
    }

    pub fn refile_request(&self, reason: &str) -> DecisionRequest {
        DecisionRequest::new(DecisionKind::Refile)
            .with("eob_id", self.id.to_string())
            .with("claim_id", self.claim_id.to_string())
            .with("eob_status", self.status.as_str())
            .with("payer", self.payer.as_str())
            .with("refile_reason", reason)
            .with("eob_amount", self.amount)
            .with_opt("denial_reasons", self.joined_denial_reasons())
    }

    fn joined_denial_reasons(&self) -> Option<String> {
        (!self.denial_reasons.is_empty()).then(|| self.denial_reasons.join(DENIAL_REASON_SEPARATOR))
    }
}
