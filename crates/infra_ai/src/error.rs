//! Inference errors

use thiserror::Error;

/// A single transport attempt failed
///
/// Every variant is eligible for the gateway's one fallback hand-off.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection to {endpoint} failed: {message}")]
    Connection { endpoint: String, message: String },

    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("Unreadable response envelope: {0}")]
    Envelope(String),

    #[error("Remote function error: {0}")]
    Remote(String),

    #[error("Transport misconfigured: {0}")]
    Configuration(String),
}

/// The gateway gave up on this call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error("Inference unavailable: primary failed ({primary}){}", fallback_note(.fallback))]
    Unavailable {
        primary: TransportError,
        fallback: Option<TransportError>,
    },
}

fn fallback_note(fallback: &Option<TransportError>) -> String {
    match fallback {
        Some(err) => format!(", fallback failed ({err})"),
        None => ", no fallback configured".to_string(),
    }
}
