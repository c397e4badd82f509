//! Property-Based Test Generators
//!
//! Strategies for claim amounts, signal wording and the noise models wrap
//! around their JSON.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money};

pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::CAD),
        Just(Currency::INR),
    ]
}

/// Positive claim amounts with two decimal places
pub fn claim_amount_strategy() -> impl Strategy<Value = Money> {
    (1i64..10_000_000i64, currency_strategy())
        .prop_map(|(cents, currency)| Money::new(Decimal::new(cents, 2), currency))
}

/// Fraud recommendations in the casings models use
pub fn fraud_recommendation_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Approve"),
        Just("approve"),
        Just("APPROVE"),
        Just("Deny"),
        Just("deny"),
        Just("Manual Review"),
        Just("Escalate"),
        Just(""),
    ]
    .prop_map(str::to_string)
}

pub fn coverage_decision_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Approved"),
        Just("approved"),
        Just("Denied"),
        Just("Pending Review"),
        Just("Partial"),
        Just(""),
    ]
    .prop_map(str::to_string)
}

pub fn validation_status_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Valid"),
        Just("valid"),
        Just("Invalid"),
        Just("Incomplete"),
        Just("pending"),
    ]
    .prop_map(str::to_string)
}

/// Prose without braces, safe to put around a JSON object
pub fn prose_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,:!?\n-]{0,80}"
}
