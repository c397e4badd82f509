//! Inference configuration
//!
//! Loaded from `INFERENCE_*` environment variables; every field has a
//! default so a bare environment yields a usable (if unreachable) setup.
//!
//! | variable | default |
//! |---|---|
//! | `INFERENCE_REASONING_URL` | `http://localhost:8000/invoke` |
//! | `INFERENCE_API_KEY` | none |
//! | `INFERENCE_MODEL_ID` | `openai.gpt-oss-120b-1:0` |
//! | `INFERENCE_SECONDARY_REASONING_URL` | none |
//! | `INFERENCE_DELEGATION_URL` | `http://localhost:8001/decide` |
//! | `INFERENCE_FUNCTION_URL` | none |
//! | `INFERENCE_FUNCTION_NAME` | `claims-decision-agent` |
//! | `INFERENCE_TIMEOUT_SECS` | `30` |
//! | `INFERENCE_MAX_TOKENS` | `4000` |
//! | `INFERENCE_TEMPERATURE` | `0.7` |
//! | `INFERENCE_TOP_P` | `0.9` |
//! | `INFERENCE_LOG_LEVEL` | `info` |

use std::time::Duration;

use serde::Deserialize;

/// Which request/response family a model id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFamily {
    /// `inputText` request, `results[0].outputText` response
    PlainText,
    /// `messages` request, `choices[0].message.content` response
    ChatCompletion,
    /// `messages` request, `content[0].text` response
    ContentArray,
}

impl ProviderFamily {
    pub fn from_model_id(model_id: &str) -> Self {
        let id = model_id.to_ascii_lowercase();
        if id.contains("titan") {
            ProviderFamily::PlainText
        } else if id.contains("gpt") || id.contains("openai") {
            ProviderFamily::ChatCompletion
        } else {
            ProviderFamily::ContentArray
        }
    }
}

/// Settings for both inference gateways
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub reasoning_url: String,
    pub api_key: Option<String>,
    pub model_id: String,
    pub secondary_reasoning_url: Option<String>,
    pub delegation_url: String,
    pub function_url: Option<String>,
    pub function_name: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub log_level: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            reasoning_url: "http://localhost:8000/invoke".to_string(),
            api_key: None,
            model_id: "openai.gpt-oss-120b-1:0".to_string(),
            secondary_reasoning_url: None,
            delegation_url: "http://localhost:8001/decide".to_string(),
            function_url: None,
            function_name: "claims-decision-agent".to_string(),
            timeout_secs: 30,
            max_tokens: 4000,
            temperature: 0.7,
            top_p: 0.9,
            log_level: "info".to_string(),
        }
    }
}

impl InferenceConfig {
    /// Loads configuration from the environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("INFERENCE"))
            .build()?
            .try_deserialize()
    }

    pub fn provider_family(&self) -> ProviderFamily {
        ProviderFamily::from_model_id(&self.model_id)
    }

    /// Bound applied to each transport attempt
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_family_from_model_id() {
        assert_eq!(
            ProviderFamily::from_model_id("amazon.titan-text-express-v1"),
            ProviderFamily::PlainText
        );
        assert_eq!(
            ProviderFamily::from_model_id("openai.gpt-oss-120b-1:0"),
            ProviderFamily::ChatCompletion
        );
        assert_eq!(
            ProviderFamily::from_model_id("mistral.mistral-large-2402-v1:0"),
            ProviderFamily::ContentArray
        );
    }

    #[test]
    fn test_defaults() {
        let config = InferenceConfig::default();
        assert_eq!(config.attempt_timeout(), Duration::from_secs(30));
        assert!(config.secondary_reasoning_url.is_none());
        assert_eq!(config.provider_family(), ProviderFamily::ChatCompletion);
    }

    #[test]
    fn test_zero_timeout_is_raised_to_one_second() {
        let config = InferenceConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.attempt_timeout(), Duration::from_secs(1));
    }
}
