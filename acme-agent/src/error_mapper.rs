//! Translates internal errors into JSON-RPC error objects.

use a2a_types::JSONRPCError;
use serde_json::json;

use crate::errors::AgentError;

/// Map an [`AgentError`] into an A2A-compliant [`JSONRPCError`].
///
/// Task failures never come through here: the executor reports those as
/// events. This covers requests that could not be run at all.
#[must_use]
pub fn to_jsonrpc_error(error: AgentError) -> JSONRPCError {
    use AgentError::{
        InvalidConfiguration, InvalidInput, MissingConfiguration, Serialization, SkillNotFound,
        TaskNotFound,
    };

    match error {
        InvalidInput(message) => JSONRPCError::invalid_params(message),
        TaskNotFound { task_id } => {
            JSONRPCError::new(JSONRPCError::TASK_NOT_FOUND, format!("Task not found: {task_id}"))
                .with_data(json!({ "taskId": task_id }))
        }
        SkillNotFound { skill_id } => {
            JSONRPCError::invalid_params(format!("Skill not found: {skill_id}"))
                .with_data(json!({ "skillId": skill_id }))
        }
        Serialization { format, reason } if format == "json" => {
            JSONRPCError::invalid_params(format!("Invalid params: {reason}"))
        }
        InvalidConfiguration { field, reason } => {
            JSONRPCError::invalid_request(format!("Invalid configuration for {field}: {reason}"))
                .with_data(json!({ "field": field, "reason": reason }))
        }
        MissingConfiguration { field } => {
            JSONRPCError::invalid_request(format!("Missing configuration: {field}"))
                .with_data(json!({ "field": field }))
        }
        other => JSONRPCError::internal("Internal error").with_data(json!({
            "details": other.to_string(),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_not_found_uses_a2a_code() {
        let error = to_jsonrpc_error(AgentError::TaskNotFound {
            task_id: "t-1".into(),
        });
        assert_eq!(error.code, JSONRPCError::TASK_NOT_FOUND);
        assert_eq!(error.data, Some(json!({ "taskId": "t-1" })));
    }

    #[test]
    fn bad_params_map_to_invalid_params() {
        let parse: AgentError = serde_json::from_str::<a2a_types::TaskIdParams>("{}")
            .unwrap_err()
            .into();
        assert_eq!(to_jsonrpc_error(parse).code, JSONRPCError::INVALID_PARAMS);

        let skill = to_jsonrpc_error(AgentError::SkillNotFound {
            skill_id: "nope".into(),
        });
        assert_eq!(skill.code, JSONRPCError::INVALID_PARAMS);
    }

    #[test]
    fn everything_else_is_internal() {
        let error = to_jsonrpc_error(AgentError::Internal {
            component: "event_bus".into(),
            reason: "receiver dropped".into(),
        });
        assert_eq!(error.code, JSONRPCError::INTERNAL_ERROR);
        assert!(error.data.unwrap()["details"]
            .as_str()
            .unwrap()
            .contains("receiver dropped"));
    }
}
