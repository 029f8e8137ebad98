//! Error handling - RFC 7807 compliant responses.

use std::time::Duration;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use quill_core::error::{DomainError, RepoError};
use quill_core::ports::{AuthError, TextGenError};
use quill_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Slug already exists: {0}")]
    SlugExists(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests")]
    TooManyRequests { retry_after: Duration },

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Problem body for this error.
    pub fn problem(&self) -> ErrorResponse {
        match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized(detail) => ErrorResponse::unauthorized().with_detail(detail),
            AppError::Forbidden(detail) => ErrorResponse::forbidden().with_detail(detail),
            AppError::SlugExists(slug) => ErrorResponse::slug_exists(slug),
            AppError::Conflict(detail) => ErrorResponse::new(409, "Conflict").with_detail(detail),
            AppError::TooManyRequests { retry_after } => {
                ErrorResponse::new(429, "Too Many Requests").with_detail(format!(
                    "Rate limit exceeded. Try again in {} seconds.",
                    retry_after.as_secs().max(1)
                ))
            }
            AppError::ServiceUnavailable(detail) => ErrorResponse::not_configured(detail),
            AppError::BadGateway(detail) => ErrorResponse::new(502, "Bad Gateway").with_detail(detail),
            AppError::Internal(_) => ErrorResponse::internal_error(),
        }
    }

    /// Full response, optionally stamped with the request ID.
    pub fn to_response(&self, request_id: Option<&str>) -> HttpResponse {
        let mut problem = self.problem();
        if let Some(id) = request_id {
            problem = problem.with_request_id(id);
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let AppError::TooManyRequests { retry_after } = self {
            builder.insert_header(("Retry-After", retry_after.as_secs().max(1).to_string()));
        }
        builder.content_type("application/problem+json").json(problem)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::SlugExists(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = self {
            tracing::error!(detail = %detail, "Internal error");
        }
        self.to_response(None)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } if id.is_empty() => {
                AppError::NotFound(format!("{entity_type} not found"))
            }
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{entity_type} '{id}' not found"))
            }
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::SlugExists(slug) => AppError::SlugExists(slug),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized => AppError::Unauthorized("Authentication required".to_string()),
            err @ DomainError::Forbidden { .. } => AppError::Forbidden(err.to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) | RepoError::Query(msg) => {
                tracing::error!(error = %msg, "Database error");
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DomainNotAllowed | AuthError::InsufficientPermissions => {
                AppError::Forbidden(err.to_string())
            }
            AuthError::TokenExpired => AppError::Unauthorized(
                "Your authentication token has expired. Please login again.".to_string(),
            ),
            AuthError::MissingAuth => AppError::Unauthorized(
                "Please provide a valid Bearer token in the Authorization header.".to_string(),
            ),
            AuthError::InvalidToken(msg) => AppError::Unauthorized(msg),
            AuthError::EmailNotVerified | AuthError::MethodDisabled => {
                AppError::Unauthorized(err.to_string())
            }
            AuthError::ProviderUnavailable(msg) => {
                tracing::error!(error = %msg, "Identity provider unreachable");
                AppError::ServiceUnavailable("Sign-in is temporarily unavailable".to_string())
            }
        }
    }
}

impl From<TextGenError> for AppError {
    fn from(err: TextGenError) -> Self {
        match err {
            TextGenError::NotConfigured => AppError::ServiceUnavailable(err.to_string()),
            TextGenError::Provider(msg) => {
                tracing::error!(error = %msg, "Text generation failed");
                AppError::BadGateway("Failed to generate completion".to_string())
            }
            TextGenError::Empty => AppError::BadGateway(err.to_string()),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_domain_errors_map_to_statuses() {
        let slug: AppError = DomainError::SlugExists("hello".to_string()).into();
        assert_eq!(slug.status_code(), StatusCode::CONFLICT);
        assert!(slug.problem().is_slug_exists());

        let forbidden: AppError = DomainError::Forbidden {
            entity_type: "Post",
            id: Uuid::nil(),
        }
        .into();
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

        let missing: AppError = DomainError::post_not_found("nope").into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_not_configured_differs_from_provider_failure() {
        let unconfigured: AppError = TextGenError::NotConfigured.into();
        assert_eq!(unconfigured.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(unconfigured.problem().is_not_configured());

        let failed: AppError = TextGenError::Provider("timeout".to_string()).into();
        assert_eq!(failed.status_code(), StatusCode::BAD_GATEWAY);
        assert!(!failed.problem().is_not_configured());
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let err = AppError::Internal("password=hunter2".to_string());
        assert_eq!(err.problem().detail, None);
    }
}
