//! Server-wide error type
//!
//! Feature handlers return their own error enums; each converts into
//! [`AppError`], which renders the standard error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::db::DbError;
use crate::external::ExternalError;
use crate::features::search::facets::FacetError;
use crate::vocabulary::VocabularyError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(DbError),

    /// Sequence or alignment collaborator failed; the cause is logged only
    #[error("External service failure: {0}")]
    External(#[from] ExternalError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::External(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => AppError::NotFound(msg),
            other => AppError::Database(other),
        }
    }
}

impl From<FacetError> for AppError {
    fn from(err: FacetError) -> Self {
        match err {
            FacetError::AmbiguousStatus(_) => AppError::NotFound(err.to_string()),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<VocabularyError> for AppError {
    fn from(err: VocabularyError) -> Self {
        match err {
            VocabularyError::Unknown(_) => AppError::BadRequest(err.to_string()),
            VocabularyError::Ambiguous(_) => AppError::NotFound(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            AppError::NotFound(msg) => ("NOT_FOUND", msg),
            AppError::BadRequest(msg) => ("BAD_REQUEST", msg),
            AppError::Unauthorized(msg) => ("UNAUTHORIZED", msg),
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                ("INTERNAL_ERROR", "A database error occurred".to_string())
            },
            AppError::External(err) => {
                tracing::warn!(error = %err, "External service failure");
                ("NOT_FOUND", "Requested sequence data is unavailable".to_string())
            },
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("INTERNAL_ERROR", "An internal error occurred".to_string())
            },
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, AppError>;
