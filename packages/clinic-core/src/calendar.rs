//! Projeção mensal do calendário
//!
//! Dado um mês e as listas completas de agendamentos e pagamentos, decide
//! em que dia do mês cada evento aparece. Regras:
//!
//! - Agendamento único: aparece no dia de `start_date`, se estiver no mês.
//! - Agendamento mensal: aparece em `day_of_month`, desde que a data
//!   candidata esteja entre `start_date` e `end_date` (ambos inclusivos).
//! - Pagamento mensal: aparece no dia do vencimento original, a partir do
//!   próprio vencimento e até `end_date`.
//! - Pagamento único ou anual: aparece no dia do vencimento, se no mês.
//! - Dias inexistentes no mês (29-31) são ignorados, sem rolar para o mês
//!   seguinte. Recorrência semanal não é expandida.
//!
//! Registros com data de referência ausente ou malformada ficam de fora.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use clinic_db::models::{
    Appointment, AppointmentFields, AppointmentRecurrence, AppointmentType, Payment,
    PaymentFields, PaymentRecurrence, PaymentStatus,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Erros de construção de datas do calendário
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Mês inválido: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Dia {day} não existe em {year}-{month:02}")]
    InvalidDay { year: i32, month: u32, day: u32 },
}

/// Mês de calendário (mês de 1 a 12)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CalendarError::InvalidMonth { year, month });
        }
        Ok(Self { year, month })
    }

    /// Mês que contém a data
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Último dia do mês: véspera do dia 1 do mês seguinte
    pub fn days_in_month(&self) -> u32 {
        let next = self.next();
        NaiveDate::from_ymd_opt(next.year, next.month, 1)
            .and_then(|first| first.pred_opt())
            .map_or(31, |last| last.day())
    }

    /// Data do dia informado, ou `None` se o dia não existir neste mês
    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Origem de um evento do calendário
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Appointment,
    Payment,
}

/// Categoria usada apenas para agrupamento visual (cor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Consulta,
    Manutencao,
    Procedimento,
    Retorno,
    /// Pagamento quitado
    Paid,
    /// Pagamento pendente ou atrasado
    Open,
}

impl From<AppointmentType> for EventCategory {
    fn from(appointment_type: AppointmentType) -> Self {
        match appointment_type {
            AppointmentType::Consulta => EventCategory::Consulta,
            AppointmentType::Manutencao => EventCategory::Manutencao,
            AppointmentType::Procedimento => EventCategory::Procedimento,
            AppointmentType::Retorno => EventCategory::Retorno,
        }
    }
}

impl From<PaymentStatus> for EventCategory {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Paid => EventCategory::Paid,
            PaymentStatus::Pending | PaymentStatus::Overdue => EventCategory::Open,
        }
    }
}

/// Rótulo exibido para cada tipo de agendamento
pub fn appointment_type_label(appointment_type: AppointmentType) -> &'static str {
    match appointment_type {
        AppointmentType::Consulta => "Consulta",
        AppointmentType::Manutencao => "Manutenção",
        AppointmentType::Procedimento => "Procedimento",
        AppointmentType::Retorno => "Retorno",
    }
}

/// Evento posicionado em um dia do mês
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub kind: EventKind,
    /// Id do agendamento ou pagamento de origem
    pub source_id: i64,
    pub title: String,
    pub patient_name: Option<String>,
    pub category: EventCategory,
}

/// Resultado da projeção: um balde por dia do mês, de 1 até o último dia
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCalendar {
    pub month: YearMonth,
    pub days: BTreeMap<u32, Vec<CalendarEvent>>,
}

impl MonthCalendar {
    fn empty(month: YearMonth) -> Self {
        let days = (1..=month.days_in_month()).map(|day| (day, Vec::new())).collect();
        Self { month, days }
    }

    /// Eventos do dia (vazio para dias fora do mês)
    pub fn events_on(&self, day: u32) -> &[CalendarEvent] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_events(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    fn push(&mut self, day: u32, event: CalendarEvent) {
        if let Some(bucket) = self.days.get_mut(&day) {
            bucket.push(event);
        }
    }
}

/// Candidata dentro de `[lower, upper]`, com limite superior opcional
fn within(candidate: NaiveDate, lower: NaiveDate, upper: Option<NaiveDate>) -> bool {
    candidate >= lower && upper.map_or(true, |end| candidate <= end)
}

fn appointment_day(month: YearMonth, appointment: &Appointment) -> Option<u32> {
    match appointment.recurrence {
        AppointmentRecurrence::Monthly => {
            let day = appointment.day_of_month.filter(|day| *day > 0)?;
            let start = appointment.start_date?;
            let candidate = month.date(day)?;
            within(candidate, start, appointment.end_date).then_some(day)
        }
        AppointmentRecurrence::None => {
            let start = appointment.start_date?;
            month.contains(start).then(|| start.day())
        }
        // TODO: definir a cadência semanal (a cada 7 dias desde start_date?) antes de expandir
        AppointmentRecurrence::Weekly => None,
    }
}

fn payment_day(month: YearMonth, payment: &Payment) -> Option<u32> {
    let due_date = payment.due_date?;
    match payment.recurrence {
        PaymentRecurrence::Monthly => {
            let day = due_date.day();
            let candidate = month.date(day)?;
            within(candidate, due_date, payment.end_date).then_some(day)
        }
        PaymentRecurrence::None | PaymentRecurrence::Yearly => {
            month.contains(due_date).then(|| due_date.day())
        }
    }
}

/// Distribui agendamentos e pagamentos pelos dias do mês.
///
/// Dentro de um dia, agendamentos vêm antes dos pagamentos, cada grupo na
/// ordem de entrada.
pub fn project_month(month: YearMonth, appointments: &[Appointment], payments: &[Payment]) -> MonthCalendar {
    let mut calendar = MonthCalendar::empty(month);

    for appointment in appointments {
        if let Some(day) = appointment_day(month, appointment) {
            calendar.push(
                day,
                CalendarEvent {
                    kind: EventKind::Appointment,
                    source_id: appointment.id,
                    title: format!(
                        "{}: {}",
                        appointment_type_label(appointment.appointment_type),
                        appointment.title
                    ),
                    patient_name: appointment.client_name.clone(),
                    category: appointment.appointment_type.into(),
                },
            );
        }
    }

    for payment in payments {
        if let Some(day) = payment_day(month, payment) {
            calendar.push(
                day,
                CalendarEvent {
                    kind: EventKind::Payment,
                    source_id: payment.id,
                    title: format!("Pagamento: R$ {:.2}", payment.amount),
                    patient_name: payment.client_name.clone(),
                    category: payment.status.into(),
                },
            );
        }
    }

    debug!("Mês {} projetado com {} eventos", month, calendar.total_events());
    calendar
}

/// Pagamento criado junto com um novo agendamento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedPayment {
    /// Dia de vencimento dentro do mês exibido
    pub day: u32,
    pub amount: f64,
    pub end_date: Option<NaiveDate>,
}

/// Monta o pagamento vinculado a um agendamento recém-criado.
///
/// O vencimento cai no mês exibido; a recorrência acompanha a do
/// agendamento (mensal ou única).
pub fn linked_payment(
    appointment: &AppointmentFields,
    linked: &LinkedPayment,
    month: YearMonth,
) -> Result<PaymentFields, CalendarError> {
    let due_date = month.date(linked.day).ok_or(CalendarError::InvalidDay {
        year: month.year(),
        month: month.month(),
        day: linked.day,
    })?;

    let recurrence = match appointment.recurrence {
        AppointmentRecurrence::Monthly => PaymentRecurrence::Monthly,
        AppointmentRecurrence::None | AppointmentRecurrence::Weekly => PaymentRecurrence::None,
    };

    Ok(PaymentFields {
        client_id: appointment.client_id,
        amount: linked.amount,
        due_date,
        status: PaymentStatus::Pending,
        description: Some(format!("Pagamento: {}", appointment.title)),
        recurrence,
        end_date: linked.end_date,
    })
}
