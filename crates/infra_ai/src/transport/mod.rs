//! Transports
//!
//! A transport makes one request and returns the provider's raw envelope.
//! It does not retry, time out on its own or interpret the envelope; the
//! gateway does all three.

mod delegation;
mod reasoning;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::prompt::Prompt;

pub use delegation::{DelegationHttpTransport, FunctionInvocationTransport};
pub use reasoning::ReasoningHttpTransport;

/// One way of reaching an inference service
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    async fn send(&self, prompt: &Prompt) -> Result<Value, TransportError>;
}

/// Maps a reqwest failure the same way for every HTTP transport
pub(crate) fn map_request_error(
    endpoint: &str,
    timeout: Duration,
    err: reqwest::Error,
) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            after_ms: timeout.as_millis() as u64,
        }
    } else {
        TransportError::Connection {
            endpoint: endpoint.to_string(),
            message: if err.is_connect() {
                "connection refused or unreachable".to_string()
            } else {
                err.to_string()
            },
        }
    }
}

/// Reads a JSON body, turning non-2xx statuses into `TransportError::Status`
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Envelope(e.to_string()))?;
    Ok(serde_json::from_str(&body).unwrap_or(Value::String(body)))
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, TransportError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TransportError::Configuration(e.to_string()))
}
