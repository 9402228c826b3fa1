//! Handlers de pagamentos, resumo financeiro e parcelamento

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use clinic_core::dashboard::{payment_summary, PaymentSummary};
use clinic_core::installments::installment_payments;
use clinic_core::plan_installments;
use clinic_core::search::filter_payments;
use clinic_db::models::{Payment, PaymentFields, PaymentRecurrence, PaymentStatus};
use clinic_db::payments as store;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::{clean, AppState, SearchQuery, ValidatedJson};
use crate::error::ApiResult;

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentRequest {
    pub client_id: i64,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub due_date: NaiveDate,
    /// Usado apenas na criação
    #[serde(default)]
    pub status: PaymentStatus,
    pub description: Option<String>,
    #[serde(default)]
    pub recurrence: PaymentRecurrence,
    pub end_date: Option<NaiveDate>,
}

impl From<PaymentRequest> for PaymentFields {
    fn from(request: PaymentRequest) -> Self {
        Self {
            client_id: request.client_id,
            amount: request.amount,
            due_date: request.due_date,
            status: request.status,
            description: clean(request.description),
            recurrence: request.recurrence,
            end_date: request.end_date,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct StatusRequest {
    pub status: PaymentStatus,
}

/// Plano de parcelamento: valor total dividido entre `start_date` e
/// `end_date` a cada `interval_days`
#[derive(Debug, Deserialize, Validate)]
pub struct InstallmentRequest {
    pub client_id: i64,
    #[validate(range(min = 0.0))]
    pub total_amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub interval_days: i64,
    pub description: Option<String>,
}

/// GET /api/payments?q=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Payment>>> {
    let payments = store::list_payments(&state.pool).await?;
    let payments = match query.q {
        Some(term) => filter_payments(payments, &term),
        None => payments,
    };
    Ok(Json(payments))
}

/// GET /api/payments/summary?q=
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<PaymentSummary>> {
    let payments = store::list_payments(&state.pool).await?;
    let payments = match query.q {
        Some(term) => filter_payments(payments, &term),
        None => payments,
    };
    Ok(Json(payment_summary(&payments)))
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Payment>> {
    Ok(Json(store::get_payment(&state.pool, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<Payment>)> {
    let id = store::create_payment(&state.pool, &request.into()).await?;
    Ok((StatusCode::CREATED, Json(store::get_payment(&state.pool, id).await?)))
}

/// Edita o pagamento preservando o status atual
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<PaymentRequest>,
) -> ApiResult<Json<Payment>> {
    store::update_payment(&state.pool, id, &request.into()).await?;
    Ok(Json(store::get_payment(&state.pool, id).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    store::delete_payment(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<StatusRequest>,
) -> ApiResult<Json<Payment>> {
    store::set_payment_status(&state.pool, id, request.status).await?;
    Ok(Json(store::get_payment(&state.pool, id).await?))
}

/// Alterna entre pago e pendente (atrasado passa a pago)
pub async fn toggle_status(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Payment>> {
    let payment = store::get_payment(&state.pool, id).await?;
    store::set_payment_status(&state.pool, id, payment.status.toggled()).await?;
    Ok(Json(store::get_payment(&state.pool, id).await?))
}

/// Grava cada parcela como um pagamento pendente.
///
/// As parcelas são gravadas uma a uma; uma falha no meio mantém as
/// anteriores.
pub async fn create_installments(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<InstallmentRequest>,
) -> ApiResult<(StatusCode, Json<Vec<Payment>>)> {
    let plan = plan_installments(
        request.total_amount,
        request.start_date,
        request.end_date,
        request.interval_days,
    )?;

    let mut created = Vec::with_capacity(plan.len());
    for fields in installment_payments(&plan, request.client_id, request.description.as_deref()) {
        let id = store::create_payment(&state.pool, &fields).await?;
        created.push(store::get_payment(&state.pool, id).await?);
    }

    info!(
        "{} parcelas geradas para o paciente {} (total {:.2})",
        created.len(),
        request.client_id,
        request.total_amount
    );
    Ok((StatusCode::CREATED, Json(created)))
}
