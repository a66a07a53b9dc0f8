use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Errors surfaced by the lead and chat handlers.
#[derive(Debug)]
pub enum AppError {
    /// Postgres failure.
    DatabaseError(sqlx::Error),
    NotFound(String),
    /// Invalid input from the caller.
    BadRequest(String),
    /// Workflow webhook or chat-model API failure.
    ExternalApiError(String),
    Unauthorized(String),
    /// Error wrapped with a context message.
    WithContext {
        source: Box<AppError>,
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(e) => write!(f, "Database error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Status code this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::WithContext { source, .. } => source.status_code(),
        }
    }
}

impl IntoResponse for AppError {
    /// Maps each variant to a status code and a `{"error": ...}` body.
    ///
    /// Database and upstream details are logged and replaced by a generic
    /// message.
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match self {
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg,
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                "External service error".to_string()
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized access: {}", msg);
                "Unauthorized".to_string()
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return (*source).into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

/// Adds context to errors, like `anyhow::Context` but for `AppError`.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Lazy variant; the closure only runs on error.
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

impl<T> ResultExt<T> for Result<T, sqlx::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::DatabaseError(e)),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::DatabaseError(e)),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ExternalApiError("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_context_keeps_source_status() {
        let result: Result<(), AppError> = Err(AppError::NotFound("lead".into()));
        let err = result.context("Loading lead").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Loading lead: Not found: lead");
    }

    #[test]
    fn test_into_response_uses_status() {
        let response = AppError::BadRequest("missing contact".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_context_response_uses_source_status() {
        let err = AppError::WithContext {
            source: Box::new(AppError::DatabaseError(sqlx::Error::RowNotFound)),
            context: "Failed to insert lead".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
