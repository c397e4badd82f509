//! EOB generation and review
//!
//! An approved claim always gets an EOB. When the model's answer is
//! missing or partial, each absent field falls back to the conservative
//! default: partial coverage at [`DEFAULT_COVERAGE_PERCENT`] of the billed
//! amount, paid by [`DEFAULT_PAYER`], dated today. Extracted amounts are
//! clamped to `[0, claim amount]`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Money, Rate};
use super::advisory::percent;
use crate::assessment::{EobAnalysis, EobDraft};
use crate::decision::ExtractedDecision;
use crate::eob::EobStatus;

pub const DEFAULT_COVERAGE_PERCENT: Decimal = dec!(80);
pub const DEFAULT_PAYER: &str = "HealthPlus Insurance";

pub fn draft_eob(decision: &ExtractedDecision, claim_amount: Money, today: NaiveDate) -> EobDraft {
    let fields = decision.view();
    let coverage = Rate::from_percentage(DEFAULT_COVERAGE_PERCENT);
    let default_payout = coverage.apply(&claim_amount).round_to_currency();
    let mut degraded = !decision.extraction_ok;

    let status = match fields.text("status").as_deref().and_then(EobStatus::parse) {
        Some(status) => status,
        None => {
            degraded = true;
            EobStatus::Partial
        }
    };

    let amount = match fields.decimal("eob_amount") {
        Some(amount) => Money::new(amount, claim_amount.currency())
            .clamp_to(&claim_amount)
            .map(|money| money.round_to_currency())
            .unwrap_or(default_payout),
        None if status == EobStatus::Denied => Money::zero(claim_amount.currency()),
        None => {
            degraded = true;
            default_payout
        }
    };

    let eob_date = fields
        .text("eob_date")
        .and_then(|text| NaiveDate::parse_from_str(&text, "%Y-%m-%d").ok())
        .unwrap_or(today);

    let payer = fields
        .text("insurance_company")
        .or_else(|| fields.text("payer"))
        .unwrap_or_else(|| {
            degraded = true;
            DEFAULT_PAYER.to_string()
        });

    let summary = fields
        .text("ai_analysis.summary")
        .or_else(|| fields.text("summary"))
        .unwrap_or_else(|| format!("Standard coverage applied at {coverage} of the billed amount"));

    EobDraft {
        amount,
        status,
        eob_date,
        payer,
        summary,
        denial_reasons: fields.strings("denial_reasons").unwrap_or_default(),
        refile_required: fields
            .flag("refile_required")
            .unwrap_or(status == EobStatus::Denied),
        degraded,
    }
}

/// Reviews an issued EOB; `recorded_reasons` are kept when the model gives none
pub fn analyze_eob(
    decision: &ExtractedDecision,
    status: EobStatus,
    amount: Money,
    recorded_reasons: &[String],
) -> EobAnalysis {
    let fields = decision.view();
    let refile_required = fields
        .flag("refile_required")
        .unwrap_or(status == EobStatus::Denied);

    EobAnalysis {
        summary: fields
            .text("summary")
            .unwrap_or_else(|| format!("EOB shows {status} status with {amount} payment")),
        coverage_analysis: fields
            .text("coverage_analysis")
            .unwrap_or_else(|| "Standard coverage analysis".to_string()),
        denial_reasons: fields
            .strings("denial_reasons")
            .unwrap_or_else(|| recorded_reasons.to_vec()),
        recommendations: fields
            .strings("recommendations")
            .filter(|items| !items.is_empty())
            .unwrap_or_else(|| {
                vec![
                    "Review coverage details".to_string(),
                    "Verify patient eligibility".to_string(),
                ]
            }),
        refile_required,
        refile_priority: fields
            .text("refile_priority")
            .unwrap_or_else(|| "medium".to_string()),
        next_steps: fields
            .strings("next_steps")
            .filter(|items| !items.is_empty())
            .unwrap_or_else(|| {
                if refile_required {
                    vec!["Prepare a refile request".to_string()]
                } else {
                    vec!["No further action required".to_string()]
                }
            }),
        confidence_score: percent(fields.decimal("confidence_score")).unwrap_or(80),
    }
}
