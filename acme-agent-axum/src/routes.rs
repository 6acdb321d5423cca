use std::sync::Arc;

use a2a_types::{AgentCard, JSONRPCRequest, JSONRPCResponse, MessageSendParams, TaskIdParams};
use acme_agent::card::{AGENT_CARD_PATH, JSONRPC_PATH, REST_PATH};
use acme_agent::request_handler::RequestHandler;
use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::error::{Error, RestError, Result};

const REST_MESSAGE_SEND: &str = "message:send";
const REST_CANCEL_SUFFIX: &str = ":cancel";

/// State shared across all routes
#[derive(Clone)]
pub struct ServerState {
    pub handler: RequestHandler,
    pub card: Arc<AgentCard>,
}

/// Create the JSON-RPC, HTTP+JSON and agent card routes
pub fn create_routes(state: ServerState) -> Router {
    Router::new()
        .route(JSONRPC_PATH, post(jsonrpc))
        .route(&format!("{REST_PATH}/v1/*action"), post(rest))
        .route(AGENT_CARD_PATH, get(agent_card))
        .with_state(state)
}

/// Handler for every JSON-RPC method. Method-level failures travel inside a
/// 200 response; only unreadable bodies map to HTTP errors.
async fn jsonrpc(State(state): State<ServerState>, body: Bytes) -> Result<Json<JSONRPCResponse>> {
    let value: serde_json::Value = serde_json::from_slice(&body)?;
    let request: JSONRPCRequest =
        serde_json::from_value(value).map_err(|e| Error::InvalidRequest(e.to_string()))?;

    tracing::debug!(method = %request.method, "JSON-RPC request");
    Ok(Json(state.handler.handle(request).await))
}

/// HTTP+JSON transport:
///
/// - `POST /a2a/rest/v1/message:send` with `MessageSendParams` as the body
/// - `POST /a2a/rest/v1/tasks/{id}:cancel`
async fn rest(
    State(state): State<ServerState>,
    Path(action): Path<String>,
    body: Bytes,
) -> std::result::Result<Response, RestError> {
    tracing::debug!(action = %action, "REST request");

    if action == REST_MESSAGE_SEND {
        let params: MessageSendParams = serde_json::from_slice(&body)?;
        let result = state.handler.send_message(params).await?;
        return Ok(Json(result).into_response());
    }

    let cancel_target = action
        .strip_prefix("tasks/")
        .and_then(|rest| rest.strip_suffix(REST_CANCEL_SUFFIX))
        .filter(|task_id| !task_id.is_empty() && !task_id.contains('/'));
    if let Some(task_id) = cancel_target {
        let task = state
            .handler
            .cancel_task(TaskIdParams {
                id: task_id.to_string(),
                metadata: None,
            })
            .await?;
        return Ok(Json(task).into_response());
    }

    Err(Error::NotFound(format!("{REST_PATH}/v1/{action}")).into())
}

async fn agent_card(State(state): State<ServerState>) -> Json<AgentCard> {
    Json(state.card.as_ref().clone())
}
