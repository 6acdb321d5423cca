use serde::{Deserialize, Serialize};

use super::EnvKey;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const DEFAULT_INSTRUCTION: &str = "You are a helpful ACME agent. Respond to the user's message in a friendly and professional way.";

/// Complete agent configuration, built once at startup.
///
/// Every section has defaults, so an empty YAML document (or no file at all)
/// only needs `ANTHROPIC_MODEL` and the API key from the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// Metadata published on the agent card
    pub card: CardConfig,

    /// HTTP listener settings
    pub server: ServerConfig,

    /// Log level and filter settings
    pub logging: LoggingConfig,

    /// Language model backing the consultation capability
    pub model: Option<ModelConfig>,

    /// Which capability answers tasks and how it is invoked
    pub capability: CapabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CardConfig {
    pub name: String,
    pub description: String,
    pub version: String,
    pub provider: Option<ProviderConfig>,
    pub documentation_url: Option<String>,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            name: "ACME Agent".to_string(),
            description: "An ACME agent that answers questions over the A2A protocol".to_string(),
            version: "0.1.0".to_string(),
            provider: Some(ProviderConfig::default()),
            documentation_url: Some("https://acme.example.com/docs/a2a-agent".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    pub organization: String,
    pub url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            organization: "ACME Corp".to_string(),
            url: "https://acme.example.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Externally reachable base URL. Falls back to `http://localhost:<port>`.
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            public_url: None,
        }
    }
}

impl ServerConfig {
    /// Address the listener binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL advertised to other agents, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive applying the level to this workspace's crates and HTTP tracing.
    #[must_use]
    pub fn filter_directive(&self) -> String {
        let level = &self.level;
        format!("acme_agent={level},acme_agent_axum={level},tower_http={level}")
    }
}

/// Model configuration variants
///
/// `api_key_env` holds the **name** of the environment variable carrying the
/// key, never the key itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ModelConfig {
    #[serde(rename = "anthropic")]
    Anthropic {
        name: String,
        #[serde(default = "default_api_key_env")]
        api_key_env: String,
        #[serde(default = "default_max_tokens")]
        max_tokens: u32,
        #[serde(default)]
        temperature: Option<f32>,
    },
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

const fn default_max_tokens() -> u32 {
    1024
}

impl ModelConfig {
    /// An Anthropic model with default key variable and token budget.
    pub fn anthropic(name: impl Into<String>) -> Self {
        Self::Anthropic {
            name: name.into(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Anthropic { name, .. } => name,
        }
    }

    #[must_use]
    pub fn api_key(&self) -> EnvKey {
        match self {
            Self::Anthropic { api_key_env, .. } => EnvKey::new(api_key_env.as_str()),
        }
    }

    #[must_use]
    pub fn temperature(&self) -> Option<f32> {
        match self {
            Self::Anthropic { temperature, .. } => *temperature,
        }
    }

    #[must_use]
    pub fn max_tokens(&self) -> u32 {
        match self {
            Self::Anthropic { max_tokens, .. } => *max_tokens,
        }
    }
}

/// Which response capability answers incoming tasks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Static greeting rule, no external calls.
    Greeting,
    /// Delegates to the configured language model.
    #[default]
    Consultation,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CapabilityConfig {
    pub kind: CapabilityKind,

    /// Instruction text placed ahead of the user's message in the prompt
    pub instruction: String,

    /// Deadline for a single generation call; unset means no deadline
    pub generation_timeout_ms: Option<u64>,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            kind: CapabilityKind::default(),
            instruction: DEFAULT_INSTRUCTION.to_string(),
            generation_timeout_ms: None,
        }
    }
}

impl CapabilityConfig {
    #[must_use]
    pub fn generation_timeout(&self) -> Option<std::time::Duration> {
        self.generation_timeout_ms
            .map(std::time::Duration::from_millis)
    }
}
