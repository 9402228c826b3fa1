//! Verificação de saúde do serviço

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::built_info;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub profile: &'static str,
    pub database: &'static str,
}

/// GET /health (503 quando o banco não responde)
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    let database_ok = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!("Banco de dados indisponível: {}", e);
            false
        }
    };

    let (status, code) = if database_ok {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(Health {
            status,
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            profile: built_info::PROFILE,
            database: if database_ok { "ok" } else { "error" },
        }),
    )
}
