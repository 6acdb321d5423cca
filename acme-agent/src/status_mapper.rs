//! Status mapping utilities for converting task events to A2A protocol types.
//!
//! This module is the only place [`TaskEvent`] meets the wire format; the
//! executor and the bus never build protocol structures themselves.

use a2a_types::{
    Message, MessageRole, Task, TaskState, TaskStatus, TaskStatusUpdateEvent, STATUS_UPDATE_KIND,
};
use serde::Serialize;

use crate::event::TaskEvent;

/// A task event in wire form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireEvent {
    StatusUpdate(TaskStatusUpdateEvent),
    Message(Message),
}

/// Creates a `TaskStatus` representing the Working state.
#[must_use]
pub fn working_status() -> TaskStatus {
    TaskStatus {
        state: TaskState::Working,
        timestamp: Some(now()),
        message: None,
    }
}

/// Creates a `TaskStatus` in the Failed state whose message carries `description`.
///
/// # Arguments
/// * `task_id` - The task that failed
/// * `context_id` - The conversation the task belongs to, if any
/// * `message_id` - Identifier for the embedded agent message
/// * `description` - Human-readable failure text
#[must_use]
pub fn failed_status(
    task_id: &str,
    context_id: Option<&str>,
    message_id: &str,
    description: &str,
) -> TaskStatus {
    TaskStatus {
        state: TaskState::Failed,
        timestamp: Some(now()),
        message: Some(agent_message(task_id, context_id, message_id, description)),
    }
}

/// Creates a single-text-part agent message tagged with the task's identifiers.
#[must_use]
pub fn agent_message(
    task_id: &str,
    context_id: Option<&str>,
    message_id: &str,
    text: &str,
) -> Message {
    Message::text(MessageRole::Agent, message_id, text)
        .with_task_id(Some(task_id.to_string()))
        .with_context_id(context_id.map(str::to_string))
}

/// Creates a `TaskStatusUpdateEvent` from a task status.
///
/// # Arguments
/// * `task_id` - The ID of the task being updated
/// * `context_id` - The context ID, absent when the task has no conversation
/// * `status` - The new task status
/// * `is_final` - Whether this is the last event for the task
#[must_use]
pub fn create_status_update_event(
    task_id: &str,
    context_id: Option<&str>,
    status: TaskStatus,
    is_final: bool,
) -> TaskStatusUpdateEvent {
    TaskStatusUpdateEvent {
        kind: STATUS_UPDATE_KIND.to_string(),
        task_id: task_id.to_string(),
        context_id: context_id.map(str::to_string),
        status,
        is_final,
        metadata: None,
    }
}

/// Converts a task event to its wire shape.
///
/// - `Working` → status-update, state `working`, `final: false`
/// - `Message` → agent message
/// - `Failed` → status-update, state `failed` with the description, `final: true`
#[must_use]
pub fn to_wire(event: &TaskEvent) -> WireEvent {
    match event {
        TaskEvent::Working {
            task_id,
            context_id,
        } => WireEvent::StatusUpdate(create_status_update_event(
            task_id,
            context_id.as_deref(),
            working_status(),
            false,
        )),
        TaskEvent::Message {
            task_id,
            context_id,
            message_id,
            text,
        } => WireEvent::Message(agent_message(task_id, context_id.as_deref(), message_id, text)),
        TaskEvent::Failed {
            task_id,
            context_id,
            message_id,
            description,
        } => WireEvent::StatusUpdate(create_status_update_event(
            task_id,
            context_id.as_deref(),
            failed_status(task_id, context_id.as_deref(), message_id, description),
            true,
        )),
    }
}

/// Builds the task object returned to a caller when a task ends in failure.
///
/// A2A requires a task id and context id on `Task`; when the request carried
/// no context the task id stands in for it.
#[must_use]
pub fn failed_task(event: &TaskEvent) -> Option<Task> {
    let TaskEvent::Failed {
        task_id,
        context_id,
        message_id,
        description,
    } = event
    else {
        return None;
    };

    Some(Task {
        kind: a2a_types::TASK_KIND.to_string(),
        id: task_id.clone(),
        context_id: context_id.clone().unwrap_or_else(|| task_id.clone()),
        status: failed_status(task_id, context_id.as_deref(), message_id, description),
        history: Vec::new(),
        metadata: None,
    })
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn working_maps_to_non_final_status_update() {
        let wire = to_wire(&TaskEvent::Working {
            task_id: "t-1".into(),
            context_id: Some("c-1".into()),
        });
        let WireEvent::StatusUpdate(update) = wire else {
            panic!("expected status update");
        };
        assert_eq!(update.kind, "status-update");
        assert_eq!(update.task_id, "t-1");
        assert_eq!(update.context_id.as_deref(), Some("c-1"));
        assert_eq!(update.status.state, TaskState::Working);
        assert!(update.status.timestamp.is_some());
        assert!(!update.is_final);
    }

    #[test]
    fn message_maps_to_agent_message() {
        let wire = to_wire(&TaskEvent::Message {
            task_id: "t-1".into(),
            context_id: None,
            message_id: "m-1".into(),
            text: "Mock response to: Hello".into(),
        });
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "message",
                "messageId": "m-1",
                "role": "agent",
                "parts": [{ "kind": "text", "text": "Mock response to: Hello" }],
                "taskId": "t-1"
            })
        );
    }

    #[test]
    fn failure_maps_to_final_failed_status() {
        let wire = to_wire(&TaskEvent::Failed {
            task_id: "t-1".into(),
            context_id: Some("c-1".into()),
            message_id: "m-1".into(),
            description: "An error occurred: boom".into(),
        });
        let value = serde_json::to_value(&wire).unwrap();
        assert_eq!(value["kind"], "status-update");
        assert_eq!(value["final"], true);
        assert_eq!(value["status"]["state"], "failed");
        assert_eq!(
            value["status"]["message"]["parts"][0]["text"],
            "An error occurred: boom"
        );
        assert_eq!(value["status"]["message"]["role"], "agent");
    }

    #[test]
    fn failed_task_uses_task_id_when_context_missing() {
        let task = failed_task(&TaskEvent::Failed {
            task_id: "t-1".into(),
            context_id: None,
            message_id: "m-1".into(),
            description: "An error occurred: boom".into(),
        })
        .unwrap();
        assert_eq!(task.context_id, "t-1");
        assert_eq!(task.status.state, TaskState::Failed);
        assert!(task.status.state.is_terminal());

        assert!(failed_task(&TaskEvent::Working {
            task_id: "t-1".into(),
            context_id: None
        })
        .is_none());
    }
}
