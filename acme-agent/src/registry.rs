//! Maps advertised skills to the executors that serve them.

use std::collections::HashMap;
use std::sync::Arc;

use a2a_types::AgentSkill;

use crate::capability::{GreetingCapability, LlmCapability, ResponseCapability};
use crate::config::{AgentConfig, CapabilityKind, EnvResolverFn};
use crate::errors::{AgentError, AgentResult};
use crate::executor::{CapabilityExecutor, RunningTask, TaskExecutor};

/// Skill id to executor table. The first registered skill is the default
/// for requests that do not name one.
#[derive(Default)]
pub struct CapabilityRegistry {
    skills: Vec<AgentSkill>,
    executors: HashMap<String, Arc<CapabilityExecutor>>,
}

impl CapabilityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry for the capability selected in `config`.
    ///
    /// # Errors
    ///
    /// Fails when the consultation capability is selected but the model or
    /// its API key is not configured.
    pub fn from_config(config: &AgentConfig, resolver: Option<&EnvResolverFn>) -> AgentResult<Self> {
        let capability: Arc<dyn ResponseCapability> = match config.capability.kind {
            CapabilityKind::Greeting => Arc::new(GreetingCapability::new()),
            CapabilityKind::Consultation => Arc::new(LlmCapability::from_config(config, resolver)?),
        };

        Ok(Self::new().register(
            CapabilityExecutor::new(capability)
                .with_generation_timeout(config.capability.generation_timeout()),
        ))
    }

    /// Adds an executor under its capability's skill. A second executor for
    /// the same skill id replaces the first.
    #[must_use]
    pub fn register(mut self, executor: CapabilityExecutor) -> Self {
        let skill_id = executor.skill_id().to_string();
        if self.executors.contains_key(&skill_id) {
            tracing::warn!(skill = %skill_id, "replacing executor for skill");
            self.skills.retain(|skill| skill.id != skill_id);
        }
        self.skills.push(executor.capability_skill());
        self.executors.insert(skill_id, Arc::new(executor));
        self
    }

    /// Skills in registration order, for the agent card.
    #[must_use]
    pub fn skills(&self) -> &[AgentSkill] {
        &self.skills
    }

    /// Executor for `skill_id`, or the default executor when `None`.
    pub fn executor_for(&self, skill_id: Option<&str>) -> AgentResult<Arc<dyn TaskExecutor>> {
        let skill_id = match skill_id {
            Some(id) => id,
            None => self
                .skills
                .first()
                .map(|skill| skill.id.as_str())
                .ok_or_else(|| AgentError::SkillNotFound {
                    skill_id: "<default>".to_string(),
                })?,
        };

        self.executors
            .get(skill_id)
            .map(|executor| Arc::clone(executor) as Arc<dyn TaskExecutor>)
            .ok_or_else(|| AgentError::SkillNotFound {
                skill_id: skill_id.to_string(),
            })
    }

    /// Cancels `task_id` wherever it is running. Returns the running task,
    /// or `None` when no executor knows it.
    pub async fn cancel(&self, task_id: &str) -> Option<RunningTask> {
        for executor in self.executors.values() {
            if let Some(running) = executor.running(task_id) {
                executor.cancel(task_id).await;
                return Some(running);
            }
        }
        None
    }
}
