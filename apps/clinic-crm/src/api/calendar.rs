//! Projeção mensal do calendário

use axum::extract::{Path, State};
use axum::Json;
use clinic_core::{project_month, MonthCalendar, YearMonth};
use clinic_db::{appointments, payments};

use super::AppState;
use crate::error::ApiResult;

/// GET /api/calendar/:year/:month (mês de 1 a 12)
pub async fn month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<Json<MonthCalendar>> {
    let month = YearMonth::new(year, month)?;
    let appointments = appointments::list_appointments(&state.pool).await?;
    let payments = payments::list_payments(&state.pool).await?;
    Ok(Json(project_month(month, &appointments, &payments)))
}
