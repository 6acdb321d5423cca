use std::path::Path;

use crate::config::{AgentConfig, CapabilityKind, ModelConfig};
use crate::errors::{AgentError, AgentResult};

/// Environment variable naming an optional YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "ACME_AGENT_CONFIG";

impl AgentConfig {
    /// Parses a YAML document. Sections missing from the document take their defaults.
    pub fn from_yaml_str(yaml: &str) -> AgentResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> AgentResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| AgentError::InvalidConfiguration {
            field: CONFIG_PATH_ENV.to_string(),
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Builds the configuration from the process environment.
    ///
    /// Reads the file named by `ACME_AGENT_CONFIG` when set, applies the
    /// environment overrides, then validates the result.
    pub fn load() -> AgentResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`AgentConfig::load`] with an explicit variable lookup.
    pub fn load_with<F>(lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.apply_env_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `PORT`, `LOG_LEVEL`, `ANTHROPIC_MODEL` and `GENERATION_TIMEOUT_MS`.
    /// Blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> AgentResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(port) = var("PORT") {
            self.server.port = port.parse::<u16>().map_err(|e| AgentError::InvalidConfiguration {
                field: "PORT".to_string(),
                reason: format!("{e}"),
            })?;
        }

        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(model) = var("ANTHROPIC_MODEL") {
            match &mut self.model {
                Some(ModelConfig::Anthropic { name, .. }) => *name = model,
                None => self.model = Some(ModelConfig::anthropic(model)),
            }
        }

        if let Some(timeout) = var("GENERATION_TIMEOUT_MS") {
            self.capability.generation_timeout_ms =
                Some(timeout.parse::<u64>().map_err(|e| AgentError::InvalidConfiguration {
                    field: "GENERATION_TIMEOUT_MS".to_string(),
                    reason: format!("{e}"),
                })?);
        }

        Ok(())
    }

    /// Checks cross-field rules that serde cannot express.
    pub fn validate(&self) -> AgentResult<()> {
        if self.card.name.trim().is_empty() {
            return Err(invalid("card.name", "agent name cannot be empty"));
        }

        if self.server.port == 0 {
            return Err(invalid("server.port", "must be greater than zero"));
        }

        if let Some(model) = &self.model {
            if model.name().trim().is_empty() {
                return Err(invalid("model.name", "model name cannot be empty"));
            }
            if let Some(temperature) = model.temperature() {
                if !(0.0..=1.0).contains(&temperature) {
                    return Err(invalid("model.temperature", "must be between 0 and 1"));
                }
            }
        }

        if self.capability.generation_timeout_ms == Some(0) {
            return Err(invalid(
                "capability.generation_timeout_ms",
                "must be greater than zero when set",
            ));
        }

        if self.capability.kind == CapabilityKind::Consultation && self.model.is_none() {
            return Err(AgentError::MissingConfiguration {
                field: "ANTHROPIC_MODEL".to_string(),
            });
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> AgentError {
    AgentError::InvalidConfiguration {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn yaml_sections_default_when_missing() {
        let config = AgentConfig::from_yaml_str(
            r"
card:
  name: Goat Advisor
capability:
  kind: greeting
",
        )
        .unwrap();

        assert_eq!(config.card.name, "Goat Advisor");
        assert_eq!(config.card.version, "0.1.0");
        assert_eq!(config.server.port, crate::config::DEFAULT_PORT);
        assert_eq!(config.capability.kind, CapabilityKind::Greeting);
        assert!(config.model.is_none());
    }

    #[test]
    fn env_overrides_apply_on_top_of_defaults() {
        let config = AgentConfig::load_with(env(&[
            ("PORT", "8080"),
            ("LOG_LEVEL", "debug"),
            ("ANTHROPIC_MODEL", "claude-3-5-haiku-latest"),
            ("GENERATION_TIMEOUT_MS", "2500"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.model.as_ref().map(ModelConfig::name),
            Some("claude-3-5-haiku-latest")
        );
        assert_eq!(
            config.capability.generation_timeout(),
            Some(std::time::Duration::from_millis(2500))
        );
    }

    #[test]
    fn consultation_without_model_is_missing_configuration() {
        let err = AgentConfig::load_with(env(&[])).unwrap_err();
        assert!(matches!(err, AgentError::MissingConfiguration { field } if field == "ANTHROPIC_MODEL"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = AgentConfig::load_with(env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, AgentError::InvalidConfiguration { field, .. } if field == "PORT"));
    }

    #[test]
    fn validation_rules() {
        let mut config = AgentConfig::default();
        config.capability.kind = CapabilityKind::Greeting;
        assert!(config.validate().is_ok());

        config.card.name = "  ".into();
        assert!(config.validate().is_err());
        config.card.name = "ACME Agent".into();

        config.server.port = 0;
        assert!(config.validate().is_err());
        config.server.port = 4000;

        config.capability.generation_timeout_ms = Some(0);
        assert!(config.validate().is_err());
        config.capability.generation_timeout_ms = None;

        config.model = Some(ModelConfig::Anthropic {
            name: "claude".into(),
            api_key_env: "ANTHROPIC_API_KEY".into(),
            max_tokens: 256,
            temperature: Some(1.5),
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("model.temperature"));
    }
}
