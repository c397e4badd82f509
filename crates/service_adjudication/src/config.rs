//! Orchestrator configuration

use serde::Deserialize;

/// Loaded from `ADJUDICATION_*` environment variables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Issue an EOB as soon as a claim is approved by the policy
    pub auto_eob: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { auto_eob: true }
    }
}

impl OrchestratorConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("ADJUDICATION"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_eob_on_by_default() {
        assert!(OrchestratorConfig::default().auto_eob);
    }

    #[test]
    fn test_missing_field_takes_default() {
        let config: OrchestratorConfig = serde_json::from_str("{}").unwrap();
        assert!(config.auto_eob);
        let config: OrchestratorConfig = serde_json::from_str(r#"{"auto_eob": false}"#).unwrap();
        assert!(!config.auto_eob);
    }
}
