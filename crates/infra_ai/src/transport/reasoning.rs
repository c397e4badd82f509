//! Reasoning-service HTTP transport

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::{http_client, map_request_error, read_json, Transport};
use crate::config::{InferenceConfig, ProviderFamily};
use crate::error::TransportError;
use crate::prompt::Prompt;

/// Posts the prompt to a model endpoint in the provider family's format
pub struct ReasoningHttpTransport {
    name: String,
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model_id: String,
    family: ProviderFamily,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    timeout: Duration,
}

impl ReasoningHttpTransport {
    pub fn new(name: &str, url: &str, config: &InferenceConfig) -> Result<Self, TransportError> {
        let timeout = config.attempt_timeout();
        Ok(Self {
            name: name.to_string(),
            client: http_client(timeout)?,
            url: url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
            family: config.provider_family(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            timeout,
        })
    }

    /// Request body for this transport's provider family
    pub fn request_body(&self, prompt: &str) -> Value {
        match self.family {
            ProviderFamily::PlainText => json!({
                "inputText": prompt,
                "textGenerationConfig": {
                    "maxTokenCount": self.max_tokens,
                    "temperature": self.temperature,
                    "topP": self.top_p,
                },
            }),
            ProviderFamily::ChatCompletion => json!({
                "model": self.model_id,
                "messages": [{"role": "user", "content": prompt}],
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "top_p": self.top_p,
            }),
            ProviderFamily::ContentArray => json!({
                "model": self.model_id,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "top_p": self.top_p,
                "messages": [{
                    "role": "user",
                    "content": [{"type": "text", "text": prompt}],
                }],
            }),
        }
    }
}

#[async_trait]
impl Transport for ReasoningHttpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, prompt), fields(transport = %self.name, kind = %prompt.kind))]
    async fn send(&self, prompt: &Prompt) -> Result<Value, TransportError> {
        let mut request = self.client.post(&self.url).json(&self.request_body(&prompt.text));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_request_error(&self.url, self.timeout, e))?;
        debug!(status = response.status().as_u16(), "reasoning service replied");
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(model_id: &str) -> ReasoningHttpTransport {
        let config = InferenceConfig {
            model_id: model_id.to_string(),
            ..Default::default()
        };
        ReasoningHttpTransport::new("primary", "http://localhost:1/", &config).unwrap()
    }

    #[test]
    fn test_plain_text_body() {
        let body = transport("amazon.titan-text-premier-v1:0").request_body("hi");
        assert_eq!(body["inputText"], "hi");
        assert_eq!(body["textGenerationConfig"]["maxTokenCount"], 4000);
    }

    #[test]
    fn test_chat_completion_body() {
        let body = transport("openai.gpt-oss-20b-1:0").request_body("hi");
        assert_eq!(body["messages"][0]["content"], "hi");
        assert_eq!(body["model"], "openai.gpt-oss-20b-1:0");
    }

    #[test]
    fn test_content_array_body() {
        let body = transport("mistral.mistral-large-2402-v1:0").request_body("hi");
        assert_eq!(body["messages"][0]["content"][0]["text"], "hi");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        assert_eq!(transport("x").url, "http://localhost:1");
    }
}
