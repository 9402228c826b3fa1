//! Clinic Core - Regras de negócio do CRM
//!
//! Funções puras sobre os registros carregados do banco:
//! - Projeção mensal de agendamentos e pagamentos recorrentes
//! - Movimentação de etapas do funil de tratamentos
//! - Geração de planos de parcelamento
//! - Indicadores do painel e busca nas listas
//!
//! Nada aqui acessa o banco; o chamador carrega os registros e passa o
//! estado (mês exibido, data de hoje) explicitamente.

pub mod calendar;
pub mod dashboard;
pub mod installments;
pub mod pipeline;
pub mod search;

pub use calendar::{project_month, CalendarError, CalendarEvent, MonthCalendar, YearMonth};
pub use installments::{plan_installments, Installment, InstallmentError};
