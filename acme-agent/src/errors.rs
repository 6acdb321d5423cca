/// Main error type for the ACME agent
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    // === Generation Errors ===
    /// A response capability failed. Displays only the carried text so the
    /// failure status reads `An error occurred: <text>`.
    #[error("{0}")]
    Generation(String),

    #[error("Generation timed out after {duration_ms}ms")]
    GenerationTimeout { duration_ms: u64 },

    #[error("Task canceled: {task_id}")]
    TaskCanceled { task_id: String },

    #[error("Task already running: {task_id}")]
    TaskAlreadyRunning { task_id: String },

    #[error("Capability panicked: {0}")]
    CapabilityPanicked(String),

    // === LLM Provider Errors ===
    #[error("LLM provider error ({provider}): {message}")]
    LlmProvider { provider: String, message: String },

    #[error("LLM API authentication failed: {provider}")]
    LlmAuthentication { provider: String },

    #[error("LLM API rate limit exceeded: {provider}")]
    LlmRateLimit { provider: String },

    #[error("LLM content filtered: {reason}")]
    ContentFiltered { reason: String },

    // === Task Protocol Errors ===
    #[error("Skill not found: {skill_id}")]
    SkillNotFound { skill_id: String },

    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: String },

    #[error("Event rejected for task {task_id}: {reason}")]
    EventRejected { task_id: String, reason: String },

    // === Configuration Errors ===
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Missing configuration: {field}")]
    MissingConfiguration { field: String },

    // === Network/IO Errors ===
    #[error("Network error: {operation}: {reason}")]
    Network { operation: String, reason: String },

    #[error("Serialization error: {format}: {reason}")]
    Serialization { format: String, reason: String },

    // === General System Errors ===
    #[error("Internal error: {component}: {reason}")]
    Internal { component: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Server start failed: {0}")]
    ServerStartFailed(String),
}

/// Convenience type alias
pub type AgentResult<T> = std::result::Result<T, AgentError>;

impl From<serde_json::Error> for AgentError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            format: "json".to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for AgentError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Serialization {
            format: "yaml".to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<std::io::Error> for AgentError {
    fn from(error: std::io::Error) -> Self {
        Self::Internal {
            component: "io".to_string(),
            reason: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network {
            operation: "http_request".to_string(),
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_to_string_contains_context() {
        let err = AgentError::InvalidConfiguration {
            field: "server.port".into(),
            reason: "must be greater than zero".into(),
        };
        let message = err.to_string();
        assert!(message.contains("server.port"));
        assert!(message.contains("greater than zero"));
    }

    #[test]
    fn generation_error_renders_bare_text() {
        assert_eq!(AgentError::Generation("boom".into()).to_string(), "boom");
    }

    #[test]
    fn cancellation_names_the_task() {
        let err = AgentError::TaskCanceled {
            task_id: "task-9".into(),
        };
        assert_eq!(err.to_string(), "Task canceled: task-9");
    }
}
