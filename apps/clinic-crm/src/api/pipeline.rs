//! Handlers do funil de tratamentos

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use clinic_core::pipeline::{
    apply_move, conversion_appointment, stage_after_conversion, ConversionOptions, StageColumn, StageMove,
};
use clinic_db::models::{Appointment, PipelineEntry, PipelineEntryFields, PipelineStage, PipelineStatus};
use clinic_db::{appointments, pipeline as store};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::{not_blank, optional_json, AppState, ValidatedJson};
use crate::error::ApiResult;

#[derive(Debug, Deserialize, Validate)]
pub struct EntryRequest {
    pub client_id: i64,
    #[validate(custom = "not_blank")]
    pub title: String,
    #[serde(default)]
    pub status: PipelineStatus,
    /// Usado apenas na criação; depois a etapa muda pelas rotas de etapa
    #[serde(default)]
    pub stage: PipelineStage,
    #[validate(range(min = 0.0))]
    pub value: Option<f64>,
    pub deadline: Option<NaiveDate>,
}

impl From<EntryRequest> for PipelineEntryFields {
    fn from(request: EntryRequest) -> Self {
        Self {
            client_id: request.client_id,
            title: request.title.trim().to_string(),
            status: request.status,
            stage: request.stage,
            value: request.value,
            deadline: request.deadline,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct StageRequest {
    pub stage: PipelineStage,
}

/// Resultado da conversão: o agendamento criado e o tratamento atualizado
#[derive(Debug, Serialize)]
pub struct Conversion {
    pub appointment: Appointment,
    pub entry: PipelineEntry,
}

/// GET /api/pipeline (mais recentes primeiro)
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<PipelineEntry>>> {
    Ok(Json(store::list_entries(&state.pool).await?))
}

/// GET /api/pipeline/board
pub async fn board(State(state): State<AppState>) -> ApiResult<Json<Vec<StageColumn>>> {
    let entries = store::list_entries(&state.pool).await?;
    Ok(Json(clinic_core::pipeline::board(&entries)))
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<PipelineEntry>> {
    Ok(Json(store::get_entry(&state.pool, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EntryRequest>,
) -> ApiResult<(StatusCode, Json<PipelineEntry>)> {
    let id = store::create_entry(&state.pool, &request.into()).await?;
    Ok((StatusCode::CREATED, Json(store::get_entry(&state.pool, id).await?)))
}

/// Edita paciente, título, valor e prazo; etapa e status não mudam
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<EntryRequest>,
) -> ApiResult<Json<PipelineEntry>> {
    store::update_entry(&state.pool, id, &request.into()).await?;
    Ok(Json(store::get_entry(&state.pool, id).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    store::delete_entry(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_stage(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<StageRequest>,
) -> ApiResult<Json<PipelineEntry>> {
    store::set_entry_stage(&state.pool, id, request.stage).await?;
    Ok(Json(store::get_entry(&state.pool, id).await?))
}

async fn move_entry(state: &AppState, id: i64, direction: StageMove) -> ApiResult<PipelineEntry> {
    let entry = store::get_entry(&state.pool, id).await?;
    let stage = apply_move(entry.stage, direction);
    if stage != entry.stage {
        store::set_entry_stage(&state.pool, id, stage).await?;
        return Ok(store::get_entry(&state.pool, id).await?);
    }
    Ok(entry)
}

pub async fn advance(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<PipelineEntry>> {
    Ok(Json(move_entry(&state, id, StageMove::Advance).await?))
}

pub async fn retreat(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<PipelineEntry>> {
    Ok(Json(move_entry(&state, id, StageMove::Retreat).await?))
}

/// Cria um agendamento único a partir do tratamento e o move para `closed`.
///
/// O corpo é opcional; sem ele valem os padrões da conversão. Um corpo
/// malformado é rejeitado antes de qualquer gravação.
pub async fn convert(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Conversion>)> {
    let options: ConversionOptions = optional_json(&body)?;
    let entry = store::get_entry(&state.pool, id).await?;

    let fields = conversion_appointment(&entry, options)?;
    let appointment_id = appointments::create_appointment(&state.pool, &fields).await?;

    if let Some(stage) = stage_after_conversion(&entry) {
        store::set_entry_stage(&state.pool, id, stage).await?;
    }
    info!("Tratamento {} convertido no agendamento {}", id, appointment_id);

    Ok((
        StatusCode::CREATED,
        Json(Conversion {
            appointment: appointments::get_appointment(&state.pool, appointment_id).await?,
            entry: store::get_entry(&state.pool, id).await?,
        }),
    ))
}
