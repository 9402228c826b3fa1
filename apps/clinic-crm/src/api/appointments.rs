//! Handlers de agendamentos, com pagamento vinculado opcional

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, NaiveDate};
use clinic_core::calendar::{linked_payment, LinkedPayment};
use clinic_core::YearMonth;
use clinic_db::models::{
    Appointment, AppointmentFields, AppointmentRecurrence, AppointmentType, Payment,
};
use clinic_db::{appointments as store, payments};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::{clean, not_blank, AppState, ValidatedJson};
use crate::error::ApiResult;

#[derive(Debug, Deserialize, Validate)]
pub struct AppointmentRequest {
    pub client_id: i64,
    #[validate(custom = "not_blank")]
    pub title: String,
    #[serde(rename = "type", default)]
    pub appointment_type: AppointmentType,
    /// Na recorrência mensal, o padrão é o dia de `start_date`
    #[validate(range(min = 1, max = 31))]
    pub day_of_month: Option<u32>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub recurrence: AppointmentRecurrence,
    pub notes: Option<String>,
    /// Aceito apenas na criação
    #[validate]
    pub payment: Option<LinkedPaymentRequest>,
}

/// Pagamento a criar junto com o agendamento
///
/// O vencimento cai no dia `day` do mês `year`/`month` (padrão: o mês de
/// `start_date`).
#[derive(Debug, Deserialize, Validate)]
pub struct LinkedPaymentRequest {
    #[validate(range(min = 1, max = 31))]
    pub day: u32,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub end_date: Option<NaiveDate>,
    pub year: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub month: Option<u32>,
}

impl AppointmentRequest {
    fn fields(&self) -> AppointmentFields {
        let day_of_month = match self.recurrence {
            AppointmentRecurrence::Monthly => self.day_of_month.or(Some(self.start_date.day())),
            AppointmentRecurrence::None | AppointmentRecurrence::Weekly => self.day_of_month,
        };

        AppointmentFields {
            client_id: self.client_id,
            title: self.title.trim().to_string(),
            appointment_type: self.appointment_type,
            day_of_month,
            start_date: self.start_date,
            end_date: self.end_date,
            recurrence: self.recurrence,
            notes: clean(self.notes.clone()),
        }
    }
}

/// Agendamento criado e, se pedido, o pagamento vinculado
#[derive(Debug, Serialize)]
pub struct CreatedAppointment {
    pub appointment: Appointment,
    pub payment: Option<Payment>,
}

/// GET /api/appointments (por data de início)
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Appointment>>> {
    Ok(Json(store::list_appointments(&state.pool).await?))
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Appointment>> {
    Ok(Json(store::get_appointment(&state.pool, id).await?))
}

/// O pagamento vinculado é validado antes de gravar o agendamento
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AppointmentRequest>,
) -> ApiResult<(StatusCode, Json<CreatedAppointment>)> {
    let fields = request.fields();

    let payment_fields = match &request.payment {
        Some(linked) => {
            let month = match (linked.year, linked.month) {
                (Some(year), Some(month)) => YearMonth::new(year, month)?,
                _ => YearMonth::of(fields.start_date),
            };
            let linked = LinkedPayment {
                day: linked.day,
                amount: linked.amount,
                end_date: linked.end_date,
            };
            Some(linked_payment(&fields, &linked, month)?)
        }
        None => None,
    };

    let id = store::create_appointment(&state.pool, &fields).await?;
    let payment = match payment_fields {
        Some(payment_fields) => {
            let payment_id = payments::create_payment(&state.pool, &payment_fields).await?;
            info!("Pagamento {} vinculado ao agendamento {}", payment_id, id);
            Some(payments::get_payment(&state.pool, payment_id).await?)
        }
        None => None,
    };

    Ok((
        StatusCode::CREATED,
        Json(CreatedAppointment {
            appointment: store::get_appointment(&state.pool, id).await?,
            payment,
        }),
    ))
}

/// O campo `payment` é ignorado na edição
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(request): ValidatedJson<AppointmentRequest>,
) -> ApiResult<Json<Appointment>> {
    store::update_appointment(&state.pool, id, &request.fields()).await?;
    Ok(Json(store::get_appointment(&state.pool, id).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    store::delete_appointment(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
