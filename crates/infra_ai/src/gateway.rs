//! Inference gateway
//!
//! Sends a prompt through the primary transport and, if that attempt fails
//! for any reason, through the fallback exactly once. Each attempt is bounded
//! by the attempt timeout. The returned text is already normalized out of
//! whatever envelope the provider used.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::InferenceConfig;
use crate::envelope;
use crate::error::{InferenceError, TransportError};
use crate::prompt::Prompt;
use crate::transport::{
    DelegationHttpTransport, FunctionInvocationTransport, ReasoningHttpTransport, Transport,
};

/// Which transport produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportUsed {
    Primary,
    Fallback,
}

/// Plain model text plus where it came from; never persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModelResponse {
    pub text: String,
    pub transport_used: TransportUsed,
    pub latency: Duration,
    /// Primary failure when the fallback answered
    pub error: Option<String>,
}

pub struct InferenceGateway {
    primary: Arc<dyn Transport>,
    fallback: Option<Arc<dyn Transport>>,
    attempt_timeout: Duration,
}

impl InferenceGateway {
    pub fn new(primary: Arc<dyn Transport>, attempt_timeout: Duration) -> Self {
        Self {
            primary,
            fallback: None,
            attempt_timeout,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn Transport>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Reasoning service, with the secondary endpoint as fallback if set
    pub fn reasoning(config: &InferenceConfig) -> Result<Self, TransportError> {
        let primary = ReasoningHttpTransport::new("reasoning-primary", &config.reasoning_url, config)?;
        let gateway = Self::new(Arc::new(primary), config.attempt_timeout());
        match &config.secondary_reasoning_url {
            Some(url) => {
                let secondary = ReasoningHttpTransport::new("reasoning-secondary", url, config)?;
                Ok(gateway.with_fallback(Arc::new(secondary)))
            }
            None => Ok(gateway),
        }
    }

    /// Delegation service, with function invocation as fallback if set
    pub fn delegation(config: &InferenceConfig) -> Result<Self, TransportError> {
        let primary = DelegationHttpTransport::new(&config.delegation_url, config)?;
        let gateway = Self::new(Arc::new(primary), config.attempt_timeout());
        match &config.function_url {
            Some(url) => {
                let function = FunctionInvocationTransport::new(url, &config.function_name, config)?;
                Ok(gateway.with_fallback(Arc::new(function)))
            }
            None => Ok(gateway),
        }
    }

    #[instrument(skip(self, prompt), fields(kind = %prompt.kind))]
    pub async fn invoke(&self, prompt: &Prompt) -> Result<RawModelResponse, InferenceError> {
        let started = Instant::now();

        let primary_error = match self.attempt(self.primary.as_ref(), prompt).await {
            Ok(text) => {
                return Ok(RawModelResponse {
                    text,
                    transport_used: TransportUsed::Primary,
                    latency: started.elapsed(),
                    error: None,
                })
            }
            Err(err) => err,
        };

        let Some(fallback) = &self.fallback else {
            warn!(error = %primary_error, "inference unavailable, no fallback configured");
            return Err(InferenceError::Unavailable {
                primary: primary_error,
                fallback: None,
            });
        };

        warn!(
            transport = self.primary.name(),
            error = %primary_error,
            "primary transport failed, trying fallback"
        );

        match self.attempt(fallback.as_ref(), prompt).await {
            Ok(text) => {
                info!(transport = fallback.name(), "fallback transport answered");
                Ok(RawModelResponse {
                    text,
                    transport_used: TransportUsed::Fallback,
                    latency: started.elapsed(),
                    error: Some(primary_error.to_string()),
                })
            }
            Err(fallback_error) => {
                warn!(
                    primary = %primary_error,
                    fallback = %fallback_error,
                    "inference unavailable"
                );
                Err(InferenceError::Unavailable {
                    primary: primary_error,
                    fallback: Some(fallback_error),
                })
            }
        }
    }

    async fn attempt(&self, transport: &dyn Transport, prompt: &Prompt) -> Result<String, TransportError> {
        let envelope = tokio::time::timeout(self.attempt_timeout, transport.send(prompt))
            .await
            .map_err(|_| TransportError::Timeout {
                after_ms: self.attempt_timeout.as_millis() as u64,
            })??;
        envelope::normalize(&envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::ScriptedTransport;
    use domain_claims::{DecisionKind, DecisionRequest};
    use serde_json::json;

    fn prompt() -> Prompt {
        crate::prompt::build(&DecisionRequest::new(DecisionKind::Chat).with("message", "hello"))
    }

    fn refused() -> TransportError {
        TransportError::Connection {
            endpoint: "http://primary".into(),
            message: "refused".into(),
        }
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = Arc::new(ScriptedTransport::replying_text("primary", "{\"response\":\"hi\"}"));
        let fallback = Arc::new(ScriptedTransport::replying_text("fallback", "unused"));
        let gateway = InferenceGateway::new(primary.clone(), Duration::from_secs(1))
            .with_fallback(fallback.clone());

        let raw = gateway.invoke(&prompt()).await.unwrap();
        assert_eq!(raw.transport_used, TransportUsed::Primary);
        assert_eq!(raw.text, "{\"response\":\"hi\"}");
        assert!(raw.error.is_none());
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test]
    async fn test_fallback_used_once_after_primary_failure() {
        let primary = Arc::new(ScriptedTransport::failing("primary", refused()));
        let fallback = Arc::new(ScriptedTransport::replying(
            "fallback",
            json!({"choices": [{"message": {"content": "from fallback"}}]}),
        ));
        let gateway = InferenceGateway::new(primary.clone(), Duration::from_secs(1))
            .with_fallback(fallback.clone());

        let raw = gateway.invoke(&prompt()).await.unwrap();
        assert_eq!(raw.transport_used, TransportUsed::Fallback);
        assert_eq!(raw.text, "from fallback");
        assert!(raw.error.unwrap().contains("refused"));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_both_failing_is_unavailable() {
        let primary = Arc::new(ScriptedTransport::failing("primary", refused()));
        let fallback = Arc::new(ScriptedTransport::failing(
            "fallback",
            TransportError::Status { status: 503, body: "down".into() },
        ));
        let gateway = InferenceGateway::new(primary.clone(), Duration::from_secs(1))
            .with_fallback(fallback.clone());

        let err = gateway.invoke(&prompt()).await.unwrap_err();
        let InferenceError::Unavailable { primary: first, fallback: second } = err;
        assert_eq!(first, refused());
        assert!(matches!(second, Some(TransportError::Status { status: 503, .. })));
        assert_eq!(primary.calls(), 1);
        assert_eq!(fallback.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_fallback_is_unavailable() {
        let gateway = InferenceGateway::new(
            Arc::new(ScriptedTransport::failing("primary", refused())),
            Duration::from_secs(1),
        );
        let InferenceError::Unavailable { fallback, .. } = gateway.invoke(&prompt()).await.unwrap_err();
        assert!(fallback.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_primary_times_out_into_fallback() {
        let primary = Arc::new(
            ScriptedTransport::replying_text("primary", "late").with_delay(Duration::from_secs(60)),
        );
        let fallback = Arc::new(ScriptedTransport::replying_text("fallback", "on time"));
        let gateway = InferenceGateway::new(primary, Duration::from_secs(5)).with_fallback(fallback);

        let raw = gateway.invoke(&prompt()).await.unwrap();
        assert_eq!(raw.transport_used, TransportUsed::Fallback);
        assert_eq!(raw.text, "on time");
        assert!(raw.error.unwrap().contains("5000ms"));
    }

    #[tokio::test]
    async fn test_error_envelope_triggers_fallback() {
        let primary = Arc::new(ScriptedTransport::replying(
            "primary",
            json!({"errorMessage": "Unhandled", "errorType": "Runtime.Error"}),
        ));
        let fallback = Arc::new(ScriptedTransport::replying_text("fallback", "ok"));
        let gateway = InferenceGateway::new(primary, Duration::from_secs(1)).with_fallback(fallback);

        let raw = gateway.invoke(&prompt()).await.unwrap();
        assert_eq!(raw.transport_used, TransportUsed::Fallback);
    }
}
