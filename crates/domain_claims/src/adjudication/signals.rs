//! The three claim-adjudication signals
//!
//! Each signal reads one field of the model's answer and casts a [`Vote`].
//! Text that matches none of the allowed values is kept as `Unrecognized`
//! and abstains, so a typo can never produce an approval.

use serde::{Deserialize, Serialize};

use crate::decision::Fields;

pub const FRAUD_RECOMMENDATION_PATH: &str = "fraudRiskAssessment.recommendation";
pub const COVERAGE_DECISION_PATH: &str = "coverageCheck.coverageDecision";
pub const VALIDATION_STATUS_PATH: &str = "validation.status";

/// How one signal bears on approval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vote {
    Affirm,
    Veto,
    Abstain,
}

fn normalize(text: &str) -> String {
    text.trim()
        .to_ascii_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fraud-risk recommendation (Approve / Deny / Manual Review)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FraudRecommendation {
    Approve,
    Deny,
    ManualReview,
    Missing,
    Unrecognized(String),
}

impl FraudRecommendation {
    pub fn parse(text: Option<&str>) -> Self {
        let Some(raw) = text else {
            return FraudRecommendation::Missing;
        };
        match normalize(raw).as_str() {
            "approve" | "approved" => FraudRecommendation::Approve,
            "deny" | "denied" => FraudRecommendation::Deny,
            "manual review" | "manual review required" | "review" => FraudRecommendation::ManualReview,
            _ => FraudRecommendation::Unrecognized(raw.to_string()),
        }
    }

    pub fn vote(&self) -> Vote {
        match self {
            FraudRecommendation::Approve => Vote::Affirm,
            FraudRecommendation::Deny => Vote::Veto,
            _ => Vote::Abstain,
        }
    }
}

/// Coverage decision (Approved / Denied / Pending Review)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageDecision {
    Approved,
    Denied,
    PendingReview,
    Missing,
    Unrecognized(String),
}

impl CoverageDecision {
    pub fn parse(text: Option<&str>) -> Self {
        let Some(raw) = text else {
            return CoverageDecision::Missing;
        };
        match normalize(raw).as_str() {
            "approved" | "approve" => CoverageDecision::Approved,
            "denied" | "deny" => CoverageDecision::Denied,
            "pending review" | "pending" => CoverageDecision::PendingReview,
            _ => CoverageDecision::Unrecognized(raw.to_string()),
        }
    }

    pub fn vote(&self) -> Vote {
        match self {
            CoverageDecision::Approved => Vote::Affirm,
            CoverageDecision::Denied => Vote::Veto,
            _ => Vote::Abstain,
        }
    }
}

/// Validation status (Valid / Invalid / Pending)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    Valid,
    Invalid,
    Pending,
    Missing,
    Unrecognized(String),
}

impl ValidationStatus {
    pub fn parse(text: Option<&str>) -> Self {
        let Some(raw) = text else {
            return ValidationStatus::Missing;
        };
        match normalize(raw).as_str() {
            "valid" => ValidationStatus::Valid,
            "invalid" => ValidationStatus::Invalid,
            "pending" | "pending review" => ValidationStatus::Pending,
            _ => ValidationStatus::Unrecognized(raw.to_string()),
        }
    }

    pub fn vote(&self) -> Vote {
        match self {
            ValidationStatus::Valid => Vote::Affirm,
            ValidationStatus::Invalid => Vote::Veto,
            _ => Vote::Abstain,
        }
    }
}

/// All three signals read from one decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimSignals {
    pub fraud: FraudRecommendation,
    pub coverage: CoverageDecision,
    pub validation: ValidationStatus,
}

impl ClaimSignals {
    pub fn read(fields: &Fields<'_>) -> Self {
        Self {
            fraud: FraudRecommendation::parse(fields.text(FRAUD_RECOMMENDATION_PATH).as_deref()),
            coverage: CoverageDecision::parse(fields.text(COVERAGE_DECISION_PATH).as_deref()),
            validation: ValidationStatus::parse(fields.text(VALIDATION_STATUS_PATH).as_deref()),
        }
    }

    pub fn votes(&self) -> [Vote; 3] {
        [self.fraud.vote(), self.coverage.vote(), self.validation.vote()]
    }

    /// Notes for every signal that was absent or unreadable
    pub fn ambiguities(&self) -> Vec<String> {
        let mut notes = Vec::new();
        match &self.fraud {
            FraudRecommendation::Missing => notes.push("fraud recommendation missing".to_string()),
            FraudRecommendation::Unrecognized(raw) => {
                notes.push(format!("unrecognized fraud recommendation '{raw}'"))
            }
            _ => {}
        }
        match &self.coverage {
            CoverageDecision::Missing => notes.push("coverage decision missing".to_string()),
            CoverageDecision::Unrecognized(raw) => {
                notes.push(format!("unrecognized coverage decision '{raw}'"))
            }
            _ => {}
        }
        match &self.validation {
            ValidationStatus::Missing => notes.push("validation status missing".to_string()),
            ValidationStatus::Unrecognized(raw) => {
                notes.push(format!("unrecognized validation status '{raw}'"))
            }
            _ => {}
        }
        notes
    }
}
