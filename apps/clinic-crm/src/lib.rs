//! Clinic CRM - serviço HTTP local sobre o banco do CRM da clínica
//!
//! Expõe pacientes, pagamentos, funil de tratamentos, agendamentos, a
//! projeção mensal do calendário e os indicadores do painel.

pub mod api;
pub mod config;
pub mod error;
pub mod telemetry;

pub use api::{build_router, AppState};
pub use error::{ApiError, ApiResult};

/// Informações geradas em tempo de build
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
