//! Error translation - the single place where failures become HTTP responses.

use actix_web::{HttpRequest, HttpResponse, ResponseError, error, http::StatusCode};

use quill_core::DomainError;
use quill_shared::ErrorResponse;

use crate::observability::current_request_id;

/// Application-level error type rendered as `{message, status, error, ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Unparseable body or query string.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unknown route or an id that cannot name any resource.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Stable machine-readable kind for the `error` field.
    fn kind(&self) -> &'static str {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Unauthenticated(_) => "unauthenticated",
                DomainError::InvalidCredentials => "invalid_credentials",
                DomainError::Forbidden(_) => "forbidden",
                DomainError::NotFound(_) => "not_found",
                DomainError::Conflict(_) => "conflict",
                DomainError::InvalidReference(_) => "invalid_reference",
                DomainError::Validation(_) => "validation_error",
                DomainError::AlreadyLiked => "already_liked",
                DomainError::NotLiked => "not_liked",
                DomainError::Internal(_) => "server_error",
            },
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
        }
    }

    fn body(&self) -> ErrorResponse {
        let status = self.status_code().as_u16();
        let body = match self {
            AppError::Domain(err) => match err {
                DomainError::Unauthenticated(reason) => {
                    ErrorResponse::new(status, self.kind(), "Not authorized")
                        .with_detail(reason.clone())
                }
                DomainError::InvalidCredentials => {
                    ErrorResponse::new(status, self.kind(), "Invalid email or password")
                }
                DomainError::Forbidden(msg)
                | DomainError::Conflict(msg)
                | DomainError::InvalidReference(msg)
                | DomainError::Validation(msg) => {
                    ErrorResponse::new(status, self.kind(), msg.clone())
                }
                DomainError::NotFound(_) => {
                    ErrorResponse::new(status, self.kind(), err.to_string())
                }
                DomainError::AlreadyLiked => {
                    ErrorResponse::new(status, self.kind(), "Blog already liked")
                }
                DomainError::NotLiked => {
                    ErrorResponse::new(status, self.kind(), "Blog not liked yet")
                }
                DomainError::Internal(detail) => {
                    tracing::error!(%detail, "Internal error");
                    ErrorResponse::internal_error()
                }
            },
            AppError::BadRequest(detail) => {
                ErrorResponse::new(status, self.kind(), "Malformed request").with_detail(detail)
            }
            AppError::NotFound(what) => {
                ErrorResponse::new(status, self.kind(), format!("{what} not found"))
            }
        };

        match current_request_id() {
            Some(id) => body.with_request_id(id),
            None => body,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Unauthenticated(_) | DomainError::InvalidCredentials => {
                    StatusCode::UNAUTHORIZED
                }
                DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
                DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                DomainError::Conflict(_) => StatusCode::CONFLICT,
                DomainError::InvalidReference(_)
                | DomainError::Validation(_)
                | DomainError::AlreadyLiked
                | DomainError::NotLiked => StatusCode::BAD_REQUEST,
                DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Invalid JSON bodies become 400s with the standard body.
pub fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, "Rejected JSON body");
    AppError::BadRequest(err.to_string()).into()
}

/// Invalid query strings become 400s with the standard body.
pub fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// A path segment that is not a valid id cannot name an existing resource.
pub fn path_error_handler(err: error::PathError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(error = %err, path = %req.path(), "Malformed path id");
    AppError::NotFound("Resource".to_string()).into()
}

/// Fallback for unmatched routes.
pub async fn route_not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(format!("Route {}", req.path())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn status_mapping() {
        let cases = [
            (DomainError::Unauthenticated("x".into()), 401),
            (DomainError::InvalidCredentials, 401),
            (DomainError::Forbidden("x".into()), 403),
            (DomainError::NotFound("Blog post"), 404),
            (DomainError::Conflict("x".into()), 409),
            (DomainError::InvalidReference("x".into()), 400),
            (DomainError::Validation("x".into()), 400),
            (DomainError::AlreadyLiked, 400),
            (DomainError::NotLiked, 400),
            (DomainError::Internal("x".into()), 500),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status_code().as_u16(), expected);
        }
    }

    #[actix_web::test]
    async fn internal_errors_do_not_leak() {
        let (status, body) = render(AppError::from(DomainError::Internal(
            "connection refused on 10.0.0.3:5432".into(),
        )))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal Server Error");
        assert!(!body.to_string().contains("10.0.0.3"));
    }

    #[actix_web::test]
    async fn not_found_names_the_entity() {
        let (_, body) = render(AppError::from(DomainError::NotFound("Blog post"))).await;

        assert_eq!(body["message"], "Blog post not found");
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["status"], 404);
    }
}
