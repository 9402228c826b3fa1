//! Indicadores do painel

use axum::extract::{Query, State};
use axum::Json;
use chrono::Local;
use clinic_core::dashboard::{dashboard as compute, monthly_revenue, DashboardStats};
use clinic_core::YearMonth;
use clinic_db::{appointments, patients, payments, pipeline};
use serde::Deserialize;

use super::AppState;
use crate::error::ApiResult;

/// Mês de referência do gráfico de receita (padrão: mês atual)
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/dashboard?year=&month=
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardStats>> {
    let today = Local::now().date_naive();

    let patients = patients::list_patients(&state.pool).await?;
    let payments = payments::list_payments(&state.pool).await?;
    let appointments = appointments::list_appointments(&state.pool).await?;
    let entries = pipeline::list_entries(&state.pool).await?;

    let mut stats = compute(&patients, &payments, &appointments, &entries, today);
    if let (Some(year), Some(month)) = (query.year, query.month) {
        stats.monthly_revenue = monthly_revenue(&payments, YearMonth::new(year, month)?);
    }
    Ok(Json(stats))
}
