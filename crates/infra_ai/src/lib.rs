//! Inference Layer
//!
//! Everything between a `DecisionRequest` and an `ExtractedDecision`.
//!
//! # Architecture
//!
//! ```text
//! DecisionRequest --prompt::build--> Prompt
//!     --InferenceGateway::invoke--> RawModelResponse (primary, then fallback once)
//!     --extractor::extract--> ExtractedDecision
//! ```
//!
//! Transports only move bytes. The gateway owns timeouts, fallback and
//! envelope normalization; the extractor owns turning model prose into a
//! JSON object and never fails.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_ai::{extractor, prompt, InferenceConfig, InferenceGateway};
//!
//! let gateway = InferenceGateway::reasoning(&InferenceConfig::from_env()?)?;
//! let prompt = prompt::build(&claim.adjudication_request());
//! let raw = gateway.invoke(&prompt).await?;
//! let decision = extractor::extract(prompt.kind, &raw.text);
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod extractor;
pub mod gateway;
pub mod prompt;
pub mod transport;

pub use config::{InferenceConfig, ProviderFamily};
pub use error::{InferenceError, TransportError};
pub use gateway::{InferenceGateway, RawModelResponse, TransportUsed};
pub use prompt::Prompt;
pub use transport::Transport;
