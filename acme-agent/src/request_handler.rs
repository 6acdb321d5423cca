//! JSON-RPC method dispatch for the A2A endpoint.
//!
//! Each `message/send` gets a fresh [`ChannelEventBus`]; the handler runs the
//! chosen executor to completion, drains the bus and turns the terminal event
//! into the method result. Transports only move bytes in and out of
//! [`RequestHandler::handle`].

use std::sync::Arc;

use a2a_types::{
    JSONRPCError, JSONRPCRequest, JSONRPCResponse, MessageSendParams, SendMessageResult, Task,
    TaskIdParams, TaskState, TaskStatus, JSONRPC_VERSION,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error_mapper::to_jsonrpc_error;
use crate::errors::{AgentError, AgentResult};
use crate::event::TaskEvent;
use crate::event_bus::ChannelEventBus;
use crate::observability::short_id;
use crate::registry::CapabilityRegistry;
use crate::status_mapper::{failed_task, to_wire, WireEvent};
use crate::task::TaskContext;

pub const METHOD_MESSAGE_SEND: &str = "message/send";
pub const METHOD_TASKS_CANCEL: &str = "tasks/cancel";

/// A2A methods this agent recognises but does not offer.
const UNSUPPORTED_METHODS: &[&str] = &[
    "message/stream",
    "tasks/get",
    "tasks/resubscribe",
    "tasks/pushNotificationConfig/set",
    "tasks/pushNotificationConfig/get",
    "tasks/pushNotificationConfig/list",
    "tasks/pushNotificationConfig/delete",
    "agent/getAuthenticatedExtendedCard",
];

/// Metadata key a caller may set to pick a skill other than the default.
pub const SKILL_METADATA_KEY: &str = "skillId";

#[derive(Clone)]
pub struct RequestHandler {
    registry: Arc<CapabilityRegistry>,
}

impl RequestHandler {
    #[must_use]
    pub const fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Handles one JSON-RPC request and always produces a response.
    pub async fn handle(&self, request: JSONRPCRequest) -> JSONRPCResponse {
        let id = request.id.clone();

        if request.jsonrpc != JSONRPC_VERSION {
            return JSONRPCResponse::error(
                id,
                JSONRPCError::invalid_request("Invalid JSON-RPC version"),
            );
        }

        let result = match request.method.as_str() {
            METHOD_MESSAGE_SEND => match decode_params::<MessageSendParams>(request.params) {
                Ok(params) => self
                    .send_message(params)
                    .await
                    .and_then(|result| serde_json::to_value(result).map_err(AgentError::from)),
                Err(err) => Err(err),
            },
            METHOD_TASKS_CANCEL => match decode_params::<TaskIdParams>(request.params) {
                Ok(params) => self
                    .cancel_task(params)
                    .await
                    .and_then(|task| serde_json::to_value(task).map_err(AgentError::from)),
                Err(err) => Err(err),
            },
            method if UNSUPPORTED_METHODS.contains(&method) => {
                return JSONRPCResponse::error(
                    id,
                    JSONRPCError::unsupported_operation(format!(
                        "Operation not supported: {method}"
                    )),
                );
            }
            method => {
                tracing::debug!(method, "unknown JSON-RPC method");
                return JSONRPCResponse::error(id, JSONRPCError::method_not_found(method));
            }
        };

        match result {
            Ok(value) => JSONRPCResponse::success(id, value),
            Err(err) => JSONRPCResponse::error(id, to_jsonrpc_error(err)),
        }
    }

    /// Runs a task for `params.message` and returns its outcome: the agent's
    /// message on success, a failed task otherwise.
    pub async fn send_message(&self, params: MessageSendParams) -> AgentResult<SendMessageResult> {
        let skill_id = requested_skill(&params);
        let executor = self.registry.executor_for(skill_id.as_deref())?;

        // Prior turns stay empty: task history is not kept between requests.
        let context = TaskContext::from_message(params.message);
        let task_id = context.task_id().to_string();

        let (bus, receiver) = ChannelEventBus::new();
        executor.execute(context, &bus).await;
        drop(bus);

        let (events, finished) = receiver.drain().await;
        if !finished {
            tracing::warn!(task = %short_id(&task_id), "event bus closed without finished signal");
        }

        let terminal = events
            .iter()
            .rev()
            .find(|event| event.is_terminal())
            .ok_or_else(|| AgentError::Internal {
                component: "request_handler".to_string(),
                reason: format!("task {task_id} produced no terminal event"),
            })?;

        terminal_result(terminal)
    }

    /// Requests cancellation of a running task.
    ///
    /// The task itself still resolves through the executor with a failure
    /// event; the returned task only acknowledges the request.
    pub async fn cancel_task(&self, params: TaskIdParams) -> AgentResult<Task> {
        let running = self
            .registry
            .cancel(&params.id)
            .await
            .ok_or_else(|| AgentError::TaskNotFound {
                task_id: params.id.clone(),
            })?;

        Ok(Task {
            kind: a2a_types::TASK_KIND.to_string(),
            context_id: running.context_id.unwrap_or_else(|| params.id.clone()),
            id: params.id,
            status: TaskStatus {
                state: TaskState::Canceled,
                timestamp: Some(chrono::Utc::now().to_rfc3339()),
                message: None,
            },
            history: Vec::new(),
            metadata: None,
        })
    }
}

fn decode_params<T: DeserializeOwned>(params: Option<Value>) -> AgentResult<T> {
    let params = params.ok_or_else(|| AgentError::InvalidInput("Missing params".to_string()))?;
    Ok(serde_json::from_value(params)?)
}

fn requested_skill(params: &MessageSendParams) -> Option<String> {
    [params.metadata.as_ref(), params.message.metadata.as_ref()]
        .into_iter()
        .flatten()
        .find_map(|metadata| metadata.get(SKILL_METADATA_KEY)?.as_str().map(str::to_string))
}

fn terminal_result(event: &TaskEvent) -> AgentResult<SendMessageResult> {
    match event {
        TaskEvent::Message { .. } => match to_wire(event) {
            WireEvent::Message(message) => Ok(SendMessageResult::Message(message)),
            WireEvent::StatusUpdate(_) => Err(unexpected(event)),
        },
        TaskEvent::Failed { .. } => failed_task(event)
            .map(SendMessageResult::Task)
            .ok_or_else(|| unexpected(event)),
        TaskEvent::Working { .. } => Err(unexpected(event)),
    }
}

fn unexpected(event: &TaskEvent) -> AgentError {
    AgentError::Internal {
        component: "request_handler".to_string(),
        reason: format!("unexpected terminal event: {}", event.kind()),
    }
}
