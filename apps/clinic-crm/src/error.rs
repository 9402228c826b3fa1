//! Erros da API e sua conversão em respostas HTTP

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinic_core::pipeline::ConversionError;
use clinic_core::{CalendarError, InstallmentError};
use clinic_db::DbError;
use thiserror::Error;
use validator::ValidationErrors;

/// Erros que podem ocorrer nos handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Requisição malformada ou campos inválidos
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Installment(#[from] InstallmentError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::Installment(_)
            | ApiError::Calendar(_)
            | ApiError::Conversion(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(DbError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Database(DbError::ConstraintViolation(_)) => StatusCode::CONFLICT,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Erro interno: {}", self);
        } else {
            tracing::debug!("Requisição rejeitada ({}): {}", status, self);
        }

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Resultado dos handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;
