//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every failure a caller can observe is one of these variants; transports map
/// them to their own status codes. Storage failures are folded into
/// [`DomainError::Internal`] before they cross this boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed, unverifiable or unresolvable credential.
    #[error("invalid token")]
    InvalidToken,

    /// Sign-in failure. Deliberately does not say which half was wrong.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The principal (or the org it belongs to) is deactivated.
    #[error("account deactivated")]
    AccountDeactivated,

    /// The entity is in the terminal `Deleted` state.
    #[error("account deleted")]
    AccountDeleted,

    /// Principal is valid but may not perform the action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error("already associated: {0}")]
    AlreadyAssociated(String),

    #[error("not associated: {0}")]
    NotAssociated(String),

    /// Uniqueness violation (username, email, role/group/task name).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A value failed validation (e.g. password policy).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Structurally unusable request (e.g. neither id nor name given).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A lifecycle transition whose precondition does not hold.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Datastore/hashing failure not attributable to caller input.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn already_associated(msg: impl Into<String>) -> Self {
        Self::AlreadyAssociated(msg.into())
    }

    pub fn not_associated(msg: impl Into<String>) -> Self {
        Self::NotAssociated(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Machine-readable code, stable across message wording changes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "invalid_token",
            Self::InvalidCredentials => "invalid_credentials",
            Self::AccountDeactivated => "account_deactivated",
            Self::AccountDeleted => "account_deleted",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::AlreadyAssociated(_) => "already_associated",
            Self::NotAssociated(_) => "not_associated",
            Self::Conflict(_) => "conflict",
            Self::Validation(_) => "validation_error",
            Self::BadRequest(_) => "bad_request",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::Internal(_) => "internal_error",
        }
    }
}
