//! Plano de parcelamento: divide um valor total em parcelas iguais,
//! espaçadas por um intervalo fixo de dias.

use chrono::{Days, NaiveDate};
use clinic_db::models::{PaymentFields, PaymentRecurrence, PaymentStatus};
use serde::Serialize;
use thiserror::Error;

/// Descrição usada quando o plano não informa uma
pub const DEFAULT_INSTALLMENT_DESCRIPTION: &str = "Parcela de Tratamento";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstallmentError {
    #[error("A data de término deve ser após o início ({start} > {end})")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("Intervalo de dias inválido: {0}")]
    InvalidInterval(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Installment {
    pub due_date: NaiveDate,
    pub amount: f64,
}

/// Gera as parcelas de `start` até `end` (inclusive), a cada `interval_days`.
///
/// O valor de cada parcela é `total / quantidade`, sem redistribuir centavos.
pub fn plan_installments(
    total: f64,
    start: NaiveDate,
    end: NaiveDate,
    interval_days: i64,
) -> Result<Vec<Installment>, InstallmentError> {
    if end < start {
        return Err(InstallmentError::EndBeforeStart { start, end });
    }
    let step = u64::try_from(interval_days)
        .ok()
        .filter(|days| *days > 0)
        .ok_or(InstallmentError::InvalidInterval(interval_days))?;

    let mut dates = Vec::new();
    let mut current = Some(start);
    while let Some(date) = current.filter(|date| *date <= end) {
        dates.push(date);
        current = date.checked_add_days(Days::new(step));
    }

    if dates.is_empty() {
        return Ok(Vec::new());
    }

    let amount = total / dates.len() as f64;
    Ok(dates
        .into_iter()
        .map(|due_date| Installment { due_date, amount })
        .collect())
}

/// Converte o plano em pagamentos pendentes, não recorrentes
pub fn installment_payments(
    plan: &[Installment],
    client_id: i64,
    description: Option<&str>,
) -> Vec<PaymentFields> {
    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_INSTALLMENT_DESCRIPTION);

    plan.iter()
        .map(|installment| PaymentFields {
            client_id,
            amount: installment.amount,
            due_date: installment.due_date,
            status: PaymentStatus::Pending,
            description: Some(description.to_string()),
            recurrence: PaymentRecurrence::None,
            end_date: None,
        })
        .collect()
}
