//! Anthropic Messages API client.

use serde_json::{json, Value};

use crate::config::{EnvResolverFn, ModelConfig};
use crate::errors::{AgentError, AgentResult};
use crate::models::{BaseLlm, LlmRequest, LlmResponse, TokenUsage};

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const PROVIDER: &str = "Anthropic";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic LLM implementation over the Messages API.
pub struct AnthropicLlm {
    model_name: String,
    api_key: String,
    max_tokens: u32,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl AnthropicLlm {
    pub fn new(model_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            api_key: api_key.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            client: reqwest::Client::new(),
        }
    }

    /// Builds a client from model configuration, resolving the API key once.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::MissingConfiguration`] when the key variable is
    /// unset or blank.
    pub fn from_config(config: &ModelConfig, resolver: Option<&EnvResolverFn>) -> AgentResult<Self> {
        let api_key = config.api_key().resolve_with(resolver)?;
        if api_key.trim().is_empty() {
            return Err(AgentError::MissingConfiguration {
                field: config.api_key().key().to_string(),
            });
        }

        let mut llm = Self::new(config.name(), api_key).with_max_tokens(config.max_tokens());
        if let Some(temperature) = config.temperature() {
            llm = llm.with_temperature(temperature);
        }
        Ok(llm)
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the sampling temperature (0.0 to 1.0).
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn build_request_payload(&self, request: &LlmRequest) -> Value {
        let messages: Vec<Value> = request
            .turns
            .iter()
            .map(|turn| {
                json!({
                    "role": turn.role.as_str(),
                    "content": turn.text,
                })
            })
            .collect();

        let mut payload = json!({
            "model": self.model_name,
            "max_tokens": self.max_tokens,
            "messages": messages,
        });

        if let Some(system) = &request.system {
            payload["system"] = json!(system);
        }
        if let Some(temperature) = self.temperature {
            payload["temperature"] = json!(temperature);
        }

        payload
    }

    /// Concatenates the text blocks of a successful response body.
    fn parse_response(response_body: &Value) -> AgentResult<LlmResponse> {
        if response_body.get("stop_reason").and_then(Value::as_str) == Some("content_filter") {
            return Err(AgentError::ContentFiltered {
                reason: "Content was filtered by Anthropic".to_string(),
            });
        }

        let blocks = response_body
            .get("content")
            .and_then(Value::as_array)
            .ok_or_else(|| AgentError::LlmProvider {
                provider: PROVIDER.to_string(),
                message: "response has no content array".to_string(),
            })?;

        let text = blocks
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("");

        Ok(LlmResponse::new(text, Self::parse_usage(response_body)))
    }

    fn parse_usage(response_body: &Value) -> TokenUsage {
        let Some(usage) = response_body.get("usage") else {
            return TokenUsage::default();
        };
        let count = |field: &str| {
            usage
                .get(field)
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0)
        };

        TokenUsage {
            input_tokens: count("input_tokens")
                + count("cache_creation_input_tokens")
                + count("cache_read_input_tokens"),
            output_tokens: count("output_tokens"),
        }
    }
}

#[async_trait::async_trait]
impl BaseLlm for AnthropicLlm {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    #[tracing::instrument(name = "anthropic.generate", skip_all, fields(model = %self.model_name))]
    async fn generate_content(&self, request: LlmRequest) -> AgentResult<LlmResponse> {
        let payload = self.build_request_payload(&request);

        let response = self
            .client
            .post(ANTHROPIC_BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(match status.as_u16() {
                401 => AgentError::LlmAuthentication {
                    provider: PROVIDER.to_string(),
                },
                429 => AgentError::LlmRateLimit {
                    provider: PROVIDER.to_string(),
                },
                _ => AgentError::LlmProvider {
                    provider: PROVIDER.to_string(),
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let response_body: Value = response.json().await?;
        let parsed = Self::parse_response(&response_body)?;
        tracing::debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "anthropic response received"
        );
        Ok(parsed)
    }
}
