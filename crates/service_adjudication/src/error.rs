//! Orchestrator errors
//!
//! Only these reach a caller. Inference and extraction trouble never does;
//! it is absorbed into a conservative decision before anything is returned.

use thiserror::Error;

use core_kernel::PortError;
use domain_claims::ClaimError;

#[derive(Debug, Error)]
pub enum AdjudicationError {
    /// The request lacked required context or failed validation
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The claim cannot make the requested move
    #[error("Claim operation rejected: {0}")]
    Rejected(String),

    #[error("Persistence failed: {0}")]
    Persistence(#[source] PortError),
}

impl AdjudicationError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdjudicationError::NotFound(_))
    }
}

impl From<ClaimError> for AdjudicationError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::MissingContextField { .. }
            | ClaimError::InvalidRegistration(_)
            | ClaimError::InvalidAmount(_) => AdjudicationError::MalformedRequest(err.to_string()),
            ClaimError::InvalidStatusTransition { .. } => AdjudicationError::Rejected(err.to_string()),
        }
    }
}

impl From<PortError> for AdjudicationError {
    fn from(err: PortError) -> Self {
        if err.is_not_found() {
            AdjudicationError::NotFound(err.to_string())
        } else {
            AdjudicationError::Persistence(err)
        }
    }
}
