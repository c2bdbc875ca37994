use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::models::InvalidBloodType;
use crate::db::DatabaseError;
use crate::dispatch::DispatchError;
use crate::ledger::LedgerError;
use crate::matching::MatchError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid blood type: {0}")]
    InvalidBloodType(String),

    #[error("Blood request not found")]
    RequestNotFound,

    #[error("Clinic location not found")]
    ClinicLocationMissing,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    InvalidTransition(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No donors selected")]
    NoDonorsSelected,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred",
            ),
            AppError::InvalidBloodType(_) => (StatusCode::BAD_REQUEST, "Invalid blood type"),
            AppError::RequestNotFound => (StatusCode::NOT_FOUND, "Blood request not found"),
            AppError::ClinicLocationMissing => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Clinic location not found",
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            AppError::Unauthorized(_) => (StatusCode::FORBIDDEN, "Access denied"),
            AppError::InvalidTransition(_) => {
                (StatusCode::CONFLICT, "Invalid notification transition")
            }
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            AppError::NoDonorsSelected => (StatusCode::BAD_REQUEST, "No donors selected"),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::Sqlx(err))
    }
}

impl From<InvalidBloodType> for AppError {
    fn from(err: InvalidBloodType) -> Self {
        AppError::InvalidBloodType(err.0)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::RequestNotFound => AppError::RequestNotFound,
            MatchError::ClinicLocationMissing => AppError::ClinicLocationMissing,
            MatchError::Database(e) => AppError::Database(DatabaseError::Sqlx(e)),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound => AppError::NotFound("Notification not found".to_string()),
            LedgerError::Unauthorized => AppError::Unauthorized(
                "Donor is not authorized to act on this notification".to_string(),
            ),
            LedgerError::InvalidTransition { .. } => AppError::InvalidTransition(err.to_string()),
            LedgerError::Validation(detail) => AppError::Validation(detail),
            LedgerError::Database(e) => AppError::Database(DatabaseError::Sqlx(e)),
        }
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NoDonorsSelected => AppError::NoDonorsSelected,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
