use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use orgguard_core::DomainError;

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let code = err.code();
    match err {
        DomainError::InvalidToken => {
            json_error(StatusCode::UNAUTHORIZED, code, "Invalid or expired JWT")
        }
        DomainError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, code, "Invalid username or Password")
        }
        DomainError::AccountDeactivated => {
            json_error(StatusCode::UNAUTHORIZED, code, "Account deactivated")
        }
        DomainError::AccountDeleted => json_error(StatusCode::FORBIDDEN, code, "Account deleted"),
        DomainError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, code, msg),
        DomainError::NotFound(what) => json_error(StatusCode::NOT_FOUND, code, format!("{what} not found")),
        DomainError::AlreadyAssociated(msg)
        | DomainError::NotAssociated(msg)
        | DomainError::Validation(msg)
        | DomainError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, code, msg),
        DomainError::Conflict(msg) | DomainError::InvalidTransition(msg) => {
            json_error(StatusCode::CONFLICT, code, msg)
        }
        DomainError::Internal(msg) => {
            error!(error = %msg, "internal error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, code, "internal error")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path id, answering 400 on garbage.
pub fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, axum::response::Response> {
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}
