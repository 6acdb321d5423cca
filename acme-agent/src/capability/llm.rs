use std::sync::Arc;
use std::time::Instant;

use a2a_types::{AgentSkill, MessageRole, Task};

use crate::capability::ResponseCapability;
use crate::config::{AgentConfig, EnvResolverFn};
use crate::errors::{AgentError, AgentResult};
use crate::models::{AnthropicLlm, BaseLlm, LlmRequest, LlmTurn};

pub const CONSULTATION_SKILL_ID: &str = "goat-farming-consultation";

/// Answers by delegating to a language model.
///
/// This is where model settings enter the system: the instruction text is
/// fixed at construction, and the model carries its own name, token budget
/// and temperature. Provider failures are returned unchanged so the executor
/// reports them through the normal failure path.
pub struct LlmCapability {
    llm: Arc<dyn BaseLlm>,
    instruction: String,
}

impl LlmCapability {
    pub fn new(llm: Arc<dyn BaseLlm>, instruction: impl Into<String>) -> Self {
        Self {
            llm,
            instruction: instruction.into(),
        }
    }

    /// Builds the capability from startup configuration, resolving the API key once.
    ///
    /// # Errors
    ///
    /// [`AgentError::MissingConfiguration`] when no model is configured or its
    /// API key cannot be resolved.
    pub fn from_config(config: &AgentConfig, resolver: Option<&EnvResolverFn>) -> AgentResult<Self> {
        let model = config
            .model
            .as_ref()
            .ok_or_else(|| AgentError::MissingConfiguration {
                field: "ANTHROPIC_MODEL".to_string(),
            })?;
        let llm = AnthropicLlm::from_config(model, resolver)?;
        Ok(Self::new(Arc::new(llm), config.capability.instruction.clone()))
    }

    #[must_use]
    pub fn skill_metadata() -> AgentSkill {
        AgentSkill::new(
            CONSULTATION_SKILL_ID,
            "Goat Farming Consultation",
            "Expert advice on goat farming: breeds, health, feeding, breeding, dairy production, and farm management",
        )
        .with_tags(["goats", "farming", "agriculture", "livestock", "dairy", "expert"])
        .with_examples([
            "What breed of goat is best for dairy production?",
            "How much space do I need for 5 goats?",
            "What should I feed my pregnant doe?",
            "How do I prevent parasites in goats?",
        ])
    }

    fn prompt(&self, text: &str) -> String {
        format!(
            "{}\n\nUser message: {text}\n\nGenerate a helpful response. Keep it concise (2-3 sentences).",
            self.instruction
        )
    }

    /// Earlier exchanges in the conversation as alternating model turns.
    fn history_turns(prior_turns: &[Task]) -> Vec<LlmTurn> {
        prior_turns
            .iter()
            .flat_map(|task| task.history.iter())
            .filter_map(|message| {
                let text = message.text_parts().collect::<Vec<_>>().join(" ");
                if text.trim().is_empty() {
                    return None;
                }
                Some(match message.role {
                    MessageRole::User => LlmTurn::user(text),
                    MessageRole::Agent => LlmTurn::assistant(text),
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ResponseCapability for LlmCapability {
    fn skill(&self) -> AgentSkill {
        Self::skill_metadata()
    }

    #[tracing::instrument(name = "llm_capability.generate", skip_all, fields(model = %self.llm.model_name()))]
    async fn generate(&self, text: &str, prior_turns: &[Task]) -> AgentResult<String> {
        let mut turns = Self::history_turns(prior_turns);
        turns.push(LlmTurn::user(self.prompt(text)));

        let started = Instant::now();
        let result = self
            .llm
            .generate_content(LlmRequest {
                system: None,
                turns,
            })
            .await;
        let duration_ms = crate::observability::elapsed_ms(started);

        match result {
            Ok(response) => {
                tracing::debug!(
                    duration_ms,
                    total_tokens = response.usage.total(),
                    "model call completed"
                );
                Ok(response.text)
            }
            Err(err) => {
                tracing::warn!(duration_ms, error = %err, "model call failed");
                Err(err)
            }
        }
    }
}
