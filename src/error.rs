//! Error types for Libris server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error")]
    Validation(Vec<String>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),
}

/// Error response body: a flat list of messages
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::BusinessRule(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let errors = match self {
            AppError::Validation(messages) => messages,
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                vec!["Database error".to_string()]
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                vec!["Internal server error".to_string()]
            }
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::BusinessRule(msg) => {
                vec![msg]
            }
        };

        (status, Json(ErrorResponse { errors })).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        AppError::Validation(messages)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rule_maps_to_bad_request() {
        let err = AppError::BusinessRule("Book already loaned".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::NotFound("Book with id 7 not found".to_string());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_errors_flatten_to_messages() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 1, message = "title must not be empty"))]
            title: String,
            #[validate(length(min = 1, message = "isbn must not be empty"))]
            isbn: String,
        }

        let probe = Probe {
            title: String::new(),
            isbn: String::new(),
        };
        let err: AppError = probe.validate().unwrap_err().into();
        match err {
            AppError::Validation(messages) => {
                assert_eq!(messages.len(), 2);
                assert!(messages.iter().any(|m| m == "title must not be empty"));
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }
}
