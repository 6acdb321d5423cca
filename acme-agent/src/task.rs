//! Per-request task context.

use a2a_types::{Message, Task};

/// Immutable snapshot of one inbound request.
///
/// Built once by the transport, read by the executor, dropped when the task
/// resolves.
#[derive(Debug, Clone)]
pub struct TaskContext {
    task_id: String,
    context_id: Option<String>,
    message: Message,
    prior_turns: Vec<Task>,
}

impl TaskContext {
    pub fn new(task_id: impl Into<String>, context_id: Option<String>, message: Message) -> Self {
        Self {
            task_id: task_id.into(),
            context_id,
            message,
            prior_turns: Vec::new(),
        }
    }

    /// Builds a context from an inbound message. The task id is taken from the
    /// message when present, otherwise a fresh UUID v4; the context id is kept
    /// exactly as received.
    #[must_use]
    pub fn from_message(message: Message) -> Self {
        let task_id = message
            .task_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let context_id = message.context_id.clone();
        Self::new(task_id, context_id, message)
    }

    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    #[must_use]
    pub fn context_id(&self) -> Option<&str> {
        self.context_id.as_deref()
    }

    #[must_use]
    pub const fn message(&self) -> &Message {
        &self.message
    }

    /// Earlier resolved tasks in the same conversation, oldest first.
    #[must_use]
    pub fn prior_turns(&self) -> &[Task] {
        &self.prior_turns
    }

    /// Text parts joined by a single space, in order. Other part kinds are
    /// ignored; a message without text yields an empty string.
    #[must_use]
    pub fn user_text(&self) -> String {
        self.message.text_parts().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_types::{MessageRole, Part};
    use serde_json::json;

    fn message_with(parts: Vec<Part>) -> Message {
        let mut message = Message::text(MessageRole::User, "m-1", "");
        message.parts = parts;
        message
    }

    #[test]
    fn joins_text_parts_with_single_space() {
        let context = TaskContext::new(
            "t-1",
            None,
            message_with(vec![Part::text("Hello"), Part::text("there")]),
        );
        assert_eq!(context.user_text(), "Hello there");
    }

    #[test]
    fn ignores_non_text_parts() {
        let context = TaskContext::new(
            "t-1",
            None,
            message_with(vec![
                Part::Data {
                    data: json!({"k": "v"}),
                    metadata: None,
                },
                Part::text("only"),
            ]),
        );
        assert_eq!(context.user_text(), "only");
    }

    #[test]
    fn no_text_parts_is_empty() {
        let context = TaskContext::new("t-1", None, message_with(Vec::new()));
        assert_eq!(context.user_text(), "");
    }

    #[test]
    fn whitespace_passes_through() {
        let context = TaskContext::new("t-1", None, message_with(vec![Part::text("   ")]));
        assert_eq!(context.user_text(), "   ");
    }

    #[test]
    fn from_message_keeps_ids_or_generates_task_id() {
        let message = Message::text(MessageRole::User, "m-1", "hi")
            .with_task_id(Some("task-7".into()))
            .with_context_id(Some("ctx-7".into()));
        let context = TaskContext::from_message(message);
        assert_eq!(context.task_id(), "task-7");
        assert_eq!(context.context_id(), Some("ctx-7"));

        let context = TaskContext::from_message(Message::text(MessageRole::User, "m-2", "hi"));
        assert!(uuid::Uuid::parse_str(context.task_id()).is_ok());
        assert_eq!(context.context_id(), None);
    }
}
