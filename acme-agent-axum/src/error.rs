use a2a_types::{JSONRPCError, JSONRPCResponse};
use acme_agent::error_mapper::to_jsonrpc_error;
use acme_agent::AgentError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid JSON-RPC request: {0}")]
    InvalidRequest(String),

    #[error("Route not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status and error object for this failure.
    fn into_parts(self) -> (StatusCode, JSONRPCError) {
        match self {
            Self::Agent(err) => {
                let status = match &err {
                    AgentError::TaskNotFound { .. } => StatusCode::NOT_FOUND,
                    AgentError::InvalidInput(_)
                    | AgentError::SkillNotFound { .. }
                    | AgentError::Serialization { .. } => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, to_jsonrpc_error(err))
            }
            Self::Json(err) => (
                StatusCode::BAD_REQUEST,
                JSONRPCError::parse_error(err.to_string()),
            ),
            Self::InvalidRequest(message) => (
                StatusCode::BAD_REQUEST,
                JSONRPCError::invalid_request(message),
            ),
            Self::NotFound(path) => (
                StatusCode::NOT_FOUND,
                JSONRPCError::method_not_found(&path),
            ),
            Self::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                JSONRPCError::internal(err.to_string()),
            ),
        }
    }
}

/// JSON-RPC transport errors: the error object wrapped in a response envelope.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error) = self.into_parts();
        // The request id is unknown when the body could not be parsed.
        (status, Json(JSONRPCResponse::error(None, error))).into_response()
    }
}

/// HTTP+JSON transport errors: the bare error object.
#[derive(Debug)]
pub struct RestError(pub Error);

impl From<Error> for RestError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl From<AgentError> for RestError {
    fn from(error: AgentError) -> Self {
        Self(Error::Agent(error))
    }
}

impl From<serde_json::Error> for RestError {
    fn from(error: serde_json::Error) -> Self {
        Self(Error::Json(error))
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, error) = self.0.into_parts();
        (status, Json(error)).into_response()
    }
}
