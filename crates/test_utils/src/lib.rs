//! Test Utilities Crate
//!
//! Shared test infrastructure for the adjudication test suite.
//!
//! # Modules
//!
//! - `fixtures`: Canned model replies and provider envelopes
//! - `builders`: Builders for registrations, claims and scripted gateways
//! - `assertions`: Assertion helpers for claim state
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
