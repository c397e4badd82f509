//! Adjudication Service
//!
//! Wires the inference layer to the claims domain. The [`Orchestrator`] is
//! the only writer of claim status and EOB records.
//!
//! # Flow
//!
//! ```text
//! decide(request, current)
//!   -> Outcome { decision, transition, audit, transport_used }
//!
//! workflows: decide, lock claim, re-read, commit, release, side effects
//!   GenerateEob        issue an EOB once per move into Approved
//!   AnalyzeDenial      store denial advice as ai_suggestions
//!   QueueManualReview  claim stays PendingApproval for an operator
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let orchestrator = Orchestrator::from_config(&InferenceConfig::from_env()?, store, OrchestratorConfig::default())?;
//! let result = orchestrator.process_claim(new_claim).await?;
//! println!("{}", result.claim.status());
//! ```

pub mod config;
pub mod error;
mod inputs;
pub mod locks;
pub mod orchestrator;
pub mod outcome;
mod workflows;

pub use config::OrchestratorConfig;
pub use error::AdjudicationError;
pub use orchestrator::Orchestrator;
pub use outcome::{ClaimDecision, EobDecision, Outcome, PatientDecision};
