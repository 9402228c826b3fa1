//! Handlers de pacientes

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use clinic_core::search::filter_patients;
use clinic_db::models::{Patient, PatientFields};
use clinic_db::patients as store;
use serde::Deserialize;
use validator::{validate_email, Validate, ValidationError};

use super::{clean, not_blank, AppState, SearchQuery, ValidatedJson};
use crate::error::ApiResult;

#[derive(Debug, Deserialize, Validate)]
pub struct PatientRequest {
    #[validate(custom = "not_blank")]
    pub name: String,
    pub phone: Option<String>,
    #[validate(custom = "email_or_blank")]
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// E-mail em branco é aceito e gravado como ausente
fn email_or_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || validate_email(value.trim()) {
        return Ok(());
    }
    Err(ValidationError::new("email"))
}

impl From<PatientRequest> for PatientFields {
    fn from(request: PatientRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            phone: clean(request.phone),
            email: clean(request.email),
            address: clean(request.address),
            notes: clean(request.notes),
        }
    }
}

/// GET /api/patients?q=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Patient>>> {
    let patients = store::list_patients(&state.pool).await?;
    let patients = match query.q {
        Some(term) => filter_patients(patients, &term),
        None => patients,
    };
    Ok(Json(patients))
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Patient>> {
    Ok(Json(store::get_patient(&state.pool, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PatientRequest>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    let id = store::create_patient(&state.pool, &request.into()).await?;
    let patient = store::get_patient(&state.pool, id).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<PatientRequest>,
) -> ApiResult<Json<Patient>> {
    store::update_patient(&state.pool, id, &request.into()).await?;
    Ok(Json(store::get_patient(&state.pool, id).await?))
}

/// Falha com 409 enquanto houver registros ligados ao paciente
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    store::delete_patient(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
