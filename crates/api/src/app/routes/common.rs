use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use orgguard_core::DomainResult;

use crate::app::errors;

/// `status` + JSON body on success, the mapped error otherwise.
pub fn reply<T: Serialize>(status: StatusCode, result: DomainResult<T>) -> axum::response::Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// `{"message": ..., <key>: body}`.
pub fn reply_with_message<T: Serialize>(
    message: &str,
    key: &str,
    result: DomainResult<T>,
) -> axum::response::Response {
    match result {
        Ok(body) => {
            let mut payload = serde_json::Map::new();
            payload.insert("message".into(), message.into());
            match serde_json::to_value(body) {
                Ok(value) => {
                    payload.insert(key.into(), value);
                }
                Err(e) => {
                    return errors::domain_error_to_response(orgguard_core::DomainError::internal(
                        e.to_string(),
                    ));
                }
            }
            (StatusCode::OK, Json(serde_json::Value::Object(payload))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Resource probes answer 200 or 403.
pub fn decision(result: DomainResult<bool>) -> axum::response::Response {
    match result {
        Ok(true) => (StatusCode::OK, Json(serde_json::json!({ "allowed": true }))).into_response(),
        Ok(false) => errors::json_error(StatusCode::FORBIDDEN, "forbidden", "Forbidden"),
        Err(e) => errors::domain_error_to_response(e),
    }
}
