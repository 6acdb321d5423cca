//! Task lifecycle events reported by the executor.

/// One event in a task's lifecycle. Every variant carries the task and
/// context identifiers of the task that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// The task is in progress. Never terminal.
    Working {
        task_id: String,
        context_id: Option<String>,
    },
    /// The agent's reply. Terminal.
    Message {
        task_id: String,
        context_id: Option<String>,
        message_id: String,
        text: String,
    },
    /// The task failed; `description` is shown to the caller. Terminal.
    Failed {
        task_id: String,
        context_id: Option<String>,
        message_id: String,
        description: String,
    },
}

impl TaskEvent {
    #[must_use]
    pub fn task_id(&self) -> &str {
        match self {
            Self::Working { task_id, .. }
            | Self::Message { task_id, .. }
            | Self::Failed { task_id, .. } => task_id,
        }
    }

    #[must_use]
    pub fn context_id(&self) -> Option<&str> {
        match self {
            Self::Working { context_id, .. }
            | Self::Message { context_id, .. }
            | Self::Failed { context_id, .. } => context_id.as_deref(),
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Working { .. })
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Working { .. } => "working",
            Self::Message { .. } => "message",
            Self::Failed { .. } => "failed",
        }
    }
}

/// What a transport drains from a bus: events, then the finished marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusSignal {
    Event(TaskEvent),
    Finished,
}

