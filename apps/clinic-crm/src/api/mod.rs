//! Rotas HTTP do CRM

pub mod appointments;
pub mod calendar;
pub mod dashboard;
pub mod health;
pub mod patients;
pub mod payments;
pub mod pipeline;

use axum::async_trait;
use axum::extract::{rejection::JsonRejection, FromRequest};
use axum::http::Request;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sqlx::SqlitePool;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use validator::{Validate, ValidationError};

use crate::error::ApiError;

/// Limite de requisições simultâneas atendidas pelo serviço
pub const MAX_CONCURRENT_REQUESTS: usize = 64;

/// Estado compartilhado entre os handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Monta o roteador completo com as camadas de trace, CORS e compressão
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Pacientes
        .route("/patients", get(patients::list).post(patients::create))
        .route(
            "/patients/:id",
            get(patients::get_one).put(patients::update).delete(patients::delete),
        )
        // Pagamentos
        .route("/payments", get(payments::list).post(payments::create))
        .route("/payments/summary", get(payments::summary))
        .route("/payments/installments", post(payments::create_installments))
        .route(
            "/payments/:id",
            get(payments::get_one).put(payments::update).delete(payments::delete),
        )
        .route("/payments/:id/status", put(payments::set_status))
        .route("/payments/:id/toggle", post(payments::toggle_status))
        // Funil
        .route("/pipeline", get(pipeline::list).post(pipeline::create))
        .route("/pipeline/board", get(pipeline::board))
        .route(
            "/pipeline/:id",
            get(pipeline::get_one).put(pipeline::update).delete(pipeline::delete),
        )
        .route("/pipeline/:id/stage", put(pipeline::set_stage))
        .route("/pipeline/:id/advance", post(pipeline::advance))
        .route("/pipeline/:id/retreat", post(pipeline::retreat))
        .route("/pipeline/:id/convert", post(pipeline::convert))
        // Agenda
        .route("/appointments", get(appointments::list).post(appointments::create))
        .route(
            "/appointments/:id",
            get(appointments::get_one)
                .put(appointments::update)
                .delete(appointments::delete),
        )
        .route("/calendar/:year/:month", get(calendar::month))
        .route("/dashboard", get(dashboard::dashboard))
}

/// Filtro textual opcional das listagens
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Corpo JSON desserializado e validado
///
/// Falhas de desserialização e de validação viram `ApiError::Validation`,
/// respondidas como 400 com corpo `{"error": ...}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    B: Send + 'static,
    Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Corpo JSON opcional: vazio vale o padrão, malformado vira 400
pub(crate) fn optional_json<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::Validation(format!("Corpo JSON inválido: {}", e)))
}

/// Rejeita textos vazios ou só com espaços
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Remove espaços e descarta textos vazios
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
