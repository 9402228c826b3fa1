//! Indicadores do painel e resumo financeiro

use chrono::NaiveDate;
use clinic_db::models::{
    Appointment, AppointmentRecurrence, AppointmentType, Patient, Payment, PaymentStatus,
    PipelineEntry,
};
use serde::Serialize;

use crate::calendar::{appointment_type_label, YearMonth};
use crate::pipeline::{board, StageColumn};

/// Quantidade de meses exibidos no gráfico de receita
pub const REVENUE_MONTHS: usize = 6;

/// Totais da tela de pagamentos
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub total: f64,
    pub paid: f64,
    /// Tudo que não está pago (pendente ou atrasado)
    pub pending: f64,
}

pub fn payment_summary(payments: &[Payment]) -> PaymentSummary {
    payments.iter().fold(PaymentSummary::default(), |mut summary, payment| {
        summary.total += payment.amount;
        if payment.status == PaymentStatus::Paid {
            summary.paid += payment.amount;
        } else {
            summary.pending += payment.amount;
        }
        summary
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: PaymentStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: YearMonth,
    pub received: f64,
    pub pending: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub patient_count: usize,
    /// Soma dos pagamentos com status `pending` (atrasados não entram)
    pub pending_total: f64,
    pub paid_total: f64,
    pub upcoming_appointments: usize,
    pub pipeline: Vec<StageColumn>,
    /// Apenas status com ao menos um pagamento
    pub payment_status: Vec<StatusCount>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
    /// Apenas tipos com ao menos um agendamento
    pub appointment_types: Vec<TypeCount>,
}

/// Agendamentos mensais sempre contam; os demais só se começam após `today`
fn is_upcoming(appointment: &Appointment, today: NaiveDate) -> bool {
    match appointment.recurrence {
        AppointmentRecurrence::Monthly => true,
        AppointmentRecurrence::None | AppointmentRecurrence::Weekly => {
            appointment.start_date.map_or(false, |start| start > today)
        }
    }
}

fn sum_where(payments: &[Payment], predicate: impl Fn(&Payment) -> bool) -> f64 {
    payments.iter().filter(|p| predicate(p)).map(|p| p.amount).sum()
}

/// Receita dos `REVENUE_MONTHS` meses que terminam em `reference`,
/// pelo vencimento original de cada pagamento.
pub fn monthly_revenue(payments: &[Payment], reference: YearMonth) -> Vec<MonthlyRevenue> {
    let mut months = Vec::with_capacity(REVENUE_MONTHS);
    let mut month = reference;
    for _ in 0..REVENUE_MONTHS {
        months.push(month);
        month = month.previous();
    }
    months.reverse();

    months
        .into_iter()
        .map(|month| {
            let in_month = |p: &Payment| p.due_date.map_or(false, |due| month.contains(due));
            MonthlyRevenue {
                month,
                received: sum_where(payments, |p| in_month(p) && p.status == PaymentStatus::Paid),
                pending: sum_where(payments, |p| in_month(p) && p.status != PaymentStatus::Paid),
            }
        })
        .collect()
}

/// Calcula os indicadores do painel para a data `today`
pub fn dashboard(
    patients: &[Patient],
    payments: &[Payment],
    appointments: &[Appointment],
    entries: &[PipelineEntry],
    today: NaiveDate,
) -> DashboardStats {
    let payment_status = PaymentStatus::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: payments.iter().filter(|p| p.status == status).count(),
        })
        .filter(|c| c.count > 0)
        .collect();

    let appointment_types = AppointmentType::ALL
        .iter()
        .map(|&appointment_type| TypeCount {
            appointment_type,
            label: appointment_type_label(appointment_type),
            count: appointments
                .iter()
                .filter(|a| a.appointment_type == appointment_type)
                .count(),
        })
        .filter(|c| c.count > 0)
        .collect();

    DashboardStats {
        patient_count: patients.len(),
        pending_total: sum_where(payments, |p| p.status == PaymentStatus::Pending),
        paid_total: sum_where(payments, |p| p.status == PaymentStatus::Paid),
        upcoming_appointments: appointments.iter().filter(|a| is_upcoming(a, today)).count(),
        pipeline: board(entries),
        payment_status,
        monthly_revenue: monthly_revenue(payments, YearMonth::of(today)),
        appointment_types,
    }
}
