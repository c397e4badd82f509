//! Core Kernel - Foundational types for the claim intake engine
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers for patients, claims and EOBs
//! - The port error type used by persistence collaborators

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate};
pub use identifiers::{PatientId, ClaimId, EobId};
pub use ports::{PortError, DomainPort};
