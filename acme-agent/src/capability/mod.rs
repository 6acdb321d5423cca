//! Response capabilities: the pluggable step that turns message text into
//! reply text.

pub mod greeting;
pub mod llm;

pub use greeting::GreetingCapability;
pub use llm::LlmCapability;

use a2a_types::{AgentSkill, Task};

use crate::errors::AgentResult;

/// Produces reply text for a task, or fails.
///
/// Implementations hold no per-task state; one instance serves every task
/// concurrently. The executor calls [`generate`](ResponseCapability::generate)
/// at most once per task and never retries.
#[async_trait::async_trait]
pub trait ResponseCapability: Send + Sync {
    /// Skill advertised on the agent card for this capability.
    fn skill(&self) -> AgentSkill;

    async fn generate(&self, text: &str, prior_turns: &[Task]) -> AgentResult<String>;
}
