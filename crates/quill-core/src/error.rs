//! Domain-level error types.

use thiserror::Error;

use crate::ports::AuthError;

/// Domain errors - business logic failures.
///
/// Every variant maps to exactly one HTTP status in the API layer; the
/// mapping lives there, not here.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No valid principal: missing, malformed or expired token, or the
    /// account behind the token no longer exists.
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// Login failed. Deliberately does not say which half was wrong.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// A valid principal lacking rights over the target.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A foreign key pointing at nothing, e.g. an unknown category id.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Post already liked by this user")]
    AlreadyLiked,

    #[error("Post not liked by this user")]
    NotLiked,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound("Resource"),
            RepoError::Constraint(msg) => DomainError::Conflict(msg),
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => DomainError::InvalidCredentials,
            AuthError::MissingAuth => {
                DomainError::Unauthenticated("no bearer token supplied".to_string())
            }
            AuthError::TokenExpired => DomainError::Unauthenticated("token expired".to_string()),
            AuthError::InvalidToken(msg) => DomainError::Unauthenticated(msg),
            AuthError::HashingError(msg) => DomainError::Internal(msg),
        }
    }
}
