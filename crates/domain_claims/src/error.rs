//! Claims domain errors

use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Missing required context field '{field}' for {kind} decision")]
    MissingContextField { kind: String, field: String },

    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
