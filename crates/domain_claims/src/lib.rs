//! Claims Domain
//!
//! Patients, claims and explanation-of-benefits records, the decision model
//! exchanged with the inference layer, and the adjudication policy that
//! turns model output into claim state.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Pending -> Approved | Denied | PendingApproval
//! PendingApproval -> Approved | Denied        (operator)
//! Approved | Denied -> Refiled                (EOB refile)
//! any -> Pending                              (claim amended, re-adjudicated)
//! ```
//!
//! Only [`adjudication`] chooses a status. Everything else reads it.

pub mod adjudication;
pub mod assessment;
pub mod claim;
pub mod decision;
pub mod eob;
pub mod error;
pub mod patient;
pub mod ports;

pub use adjudication::{PolicyOutcome, SideEffect};
pub use assessment::{
    ChatReply, ClaimAssessment, ClaimSuggestions, Decision, DenialAnalysis, EobAnalysis, EobDraft,
    RefileRecommendation, RegistrationAssessment,
};
pub use claim::{Claim, ClaimStatus, ClaimUpdate, NewClaim};
pub use decision::{
    ContextValue, DecisionKind, DecisionRequest, ExtractedDecision, ExtractionFailure, Fields,
};
pub use eob::{EobRecord, EobStatus};
pub use error::ClaimError;
pub use patient::{Patient, PatientRegistration};
pub use ports::ClaimsStore;
