//! Decision-delegation transports
//!
//! The delegation service takes `{message, context, timestamp}` over plain
//! HTTP. Its fallback invokes the same agent as a function through an
//! invocation endpoint, which answers either with the structure directly or
//! nested under `body`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{http_client, map_request_error, read_json, Transport};
use crate::config::InferenceConfig;
use crate::error::TransportError;
use crate::prompt::Prompt;

/// Header set by function runtimes when the function itself failed
const FUNCTION_ERROR_HEADER: &str = "x-amz-function-error";

#[derive(Debug, Serialize)]
struct DelegationPayload<'a> {
    message: &'a str,
    context: &'a str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    workflow: Option<&'a str>,
}

impl<'a> DelegationPayload<'a> {
    fn new(prompt: &'a Prompt, workflow: Option<&'a str>) -> Self {
        Self {
            message: &prompt.text,
            context: &prompt.summary,
            timestamp: Utc::now().to_rfc3339(),
            workflow,
        }
    }
}

/// Primary delegation transport: JSON over HTTP
pub struct DelegationHttpTransport {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl DelegationHttpTransport {
    pub fn new(url: &str, config: &InferenceConfig) -> Result<Self, TransportError> {
        let timeout = config.attempt_timeout();
        Ok(Self {
            client: http_client(timeout)?,
            url: url.to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl Transport for DelegationHttpTransport {
    fn name(&self) -> &str {
        "delegation-http"
    }

    #[instrument(skip(self, prompt), fields(kind = %prompt.kind))]
    async fn send(&self, prompt: &Prompt) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(&DelegationPayload::new(prompt, None))
            .send()
            .await
            .map_err(|e| map_request_error(&self.url, self.timeout, e))?;
        debug!(status = response.status().as_u16(), "delegation service replied");
        read_json(response).await
    }
}

/// Fallback delegation transport: function invocation over HTTP
pub struct FunctionInvocationTransport {
    client: reqwest::Client,
    invoke_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl FunctionInvocationTransport {
    pub fn new(base_url: &str, function_name: &str, config: &InferenceConfig) -> Result<Self, TransportError> {
        if function_name.trim().is_empty() {
            return Err(TransportError::Configuration("function name is empty".to_string()));
        }
        let timeout = config.attempt_timeout();
        Ok(Self {
            client: http_client(timeout)?,
            invoke_url: format!(
                "{}/2015-03-31/functions/{}/invocations",
                base_url.trim_end_matches('/'),
                function_name
            ),
            api_key: config.api_key.clone(),
            timeout,
        })
    }

    pub fn invoke_url(&self) -> &str {
        &self.invoke_url
    }
}

#[async_trait]
impl Transport for FunctionInvocationTransport {
    fn name(&self) -> &str {
        "function-invocation"
    }

    #[instrument(skip(self, prompt), fields(kind = %prompt.kind))]
    async fn send(&self, prompt: &Prompt) -> Result<Value, TransportError> {
        let workflow = prompt.kind.to_string();
        let mut request = self
            .client
            .post(&self.invoke_url)
            .json(&DelegationPayload::new(prompt, Some(workflow.as_str())));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_request_error(&self.invoke_url, self.timeout, e))?;

        let function_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let envelope = read_json(response).await?;
        if let Some(kind) = function_error {
            let message = envelope
                .get("errorMessage")
                .and_then(Value::as_str)
                .unwrap_or(kind.as_str())
                .to_string();
            return Err(TransportError::Remote(message));
        }
        Ok(envelope)
    }
}
