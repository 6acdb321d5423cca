//! Language model access for the consultation capability.
//!
//! [`BaseLlm`] is the seam between the capability and a concrete provider;
//! tests substitute a fake, production uses [`AnthropicLlm`].

pub mod anthropic;

pub use anthropic::AnthropicLlm;

use crate::errors::AgentResult;

/// Speaker of one conversation turn sent to a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmRole {
    User,
    Assistant,
}

impl LlmRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmTurn {
    pub role: LlmRole,
    pub text: String,
}

impl LlmTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: LlmRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: LlmRole::Assistant,
            text: text.into(),
        }
    }
}

/// A single completion request: optional system prompt plus ordered turns,
/// the last of which is the user's current message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmRequest {
    pub system: Option<String>,
    pub turns: Vec<LlmTurn>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    pub text: String,
    pub usage: TokenUsage,
}

impl LlmResponse {
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}

/// Base trait for Large Language Model implementations.
///
/// Implementors map provider failures into [`AgentError`](crate::errors::AgentError)
/// variants; callers decide how those surface to clients.
#[async_trait::async_trait]
pub trait BaseLlm: Send + Sync {
    /// Stable model identifier, used in logs.
    fn model_name(&self) -> &str;

    async fn generate_content(&self, request: LlmRequest) -> AgentResult<LlmResponse>;
}
