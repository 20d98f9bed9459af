//! Error types for the library catalog

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::{DependentSummary, EntityKind, RecordId};

/// Numeric error codes carried in every error body.
///
/// Clients match on these values; they are part of the API and must not be
/// renumbered. New codes are appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 2,
    NoSuchRecord = 3,
    BadValue = 4,
    HasDependents = 5,
}

/// One validation failure: the offending field and a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad input or unresolved references; nothing was written.
    #[error("Validation failed: {} field error(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Delete refused while other records still point at the target.
    #[error("Cannot delete {kind} {id}: {} dependent record(s)", dependents.len())]
    DeleteBlocked {
        kind: EntityKind,
        id: RecordId,
        dependents: Vec<DependentSummary>,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Field errors carried by a validation failure, empty otherwise
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

/// Error response body
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependents: Vec<DependentSummary>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code, message, field_errors, dependents) = match self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::BadValue,
                message,
                errors,
                vec![],
            ),
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord, msg, vec![], vec![])
            }
            AppError::DeleteBlocked { dependents, .. } => (
                StatusCode::CONFLICT,
                ErrorCode::HasDependents,
                message,
                vec![],
                dependents,
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                    vec![],
                    vec![],
                )
            }
            AppError::Serialization(e) => {
                tracing::error!("Stored document could not be decoded: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                    vec![],
                    vec![],
                )
            }
            AppError::Store(msg) => {
                tracing::error!("Store error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                    vec![],
                    vec![],
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                    vec![],
                    vec![],
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            field_errors,
            dependents,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_counts_fields() {
        let err = AppError::Validation(vec![
            FieldError::new("title", "Title field can NOT be empty"),
            FieldError::new("isbn", "ISBN field can NOT be empty"),
        ]);
        assert_eq!(err.to_string(), "Validation failed: 2 field error(s)");
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_status_mapping() {
        let not_found = AppError::NotFound("Genre x not found".to_string()).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let blocked = AppError::DeleteBlocked {
            kind: EntityKind::Genre,
            id: RecordId::new(),
            dependents: vec![],
        }
        .into_response();
        assert_eq!(blocked.status(), StatusCode::CONFLICT);

        let invalid = AppError::Validation(vec![]).into_response();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let store = AppError::Store("lock poisoned".to_string()).into_response();
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    async fn body_of(err: AppError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_codes_in_body() {
        let body = body_of(AppError::Internal("boom".to_string())).await;
        assert_eq!(body["code"], 1);
        assert_eq!(body["error"], "Failure");

        let body = body_of(AppError::Store("lock poisoned".to_string())).await;
        assert_eq!(body["code"], 2);
        assert_eq!(body["message"], "Database error");

        let body = body_of(AppError::NotFound("Book x not found".to_string())).await;
        assert_eq!(body["code"], 3);

        let body = body_of(AppError::Validation(vec![FieldError::new("name", "too short")])).await;
        assert_eq!(body["code"], 4);
        assert_eq!(body["field_errors"][0]["field"], "name");

        let body = body_of(AppError::DeleteBlocked {
            kind: EntityKind::Author,
            id: RecordId::new(),
            dependents: vec![],
        })
        .await;
        assert_eq!(body["code"], 5);
        assert_eq!(body["error"], "HasDependents");
    }
}
