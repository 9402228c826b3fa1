//! Funil de tratamentos: movimentação de etapas, quadro por etapa e
//! conversão de tratamento em agendamento.

use chrono::NaiveDate;
use clinic_db::models::{
    AppointmentFields, AppointmentRecurrence, AppointmentType, PipelineEntry, PipelineStage,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direção de movimento no funil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageMove {
    Advance,
    Retreat,
}

fn position(stage: PipelineStage) -> usize {
    PipelineStage::ALL
        .iter()
        .position(|s| *s == stage)
        .unwrap_or_default()
}

/// Próxima etapa; `closed` permanece `closed`
pub fn advance(stage: PipelineStage) -> PipelineStage {
    PipelineStage::ALL
        .get(position(stage) + 1)
        .copied()
        .unwrap_or(stage)
}

/// Etapa anterior; `lead` permanece `lead`
pub fn retreat(stage: PipelineStage) -> PipelineStage {
    position(stage)
        .checked_sub(1)
        .and_then(|i| PipelineStage::ALL.get(i))
        .copied()
        .unwrap_or(stage)
}

pub fn apply_move(stage: PipelineStage, direction: StageMove) -> PipelineStage {
    match direction {
        StageMove::Advance => advance(stage),
        StageMove::Retreat => retreat(stage),
    }
}

/// Título da coluna de cada etapa no quadro
pub fn stage_label(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::Lead => "Novos Leads",
        PipelineStage::Contact => "Em Contato",
        PipelineStage::Proposal => "Orçamento/Plano",
        PipelineStage::Negotiation => "Negociação",
        PipelineStage::Closed => "Tratamento Iniciado",
    }
}

/// Resumo de uma coluna do quadro
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageColumn {
    pub stage: PipelineStage,
    pub label: &'static str,
    pub count: usize,
    /// Soma dos valores estimados (ausente conta como zero)
    pub total_value: f64,
}

/// Quantidade e valor por etapa, na ordem do funil
pub fn board(entries: &[PipelineEntry]) -> Vec<StageColumn> {
    PipelineStage::ALL
        .iter()
        .map(|&stage| {
            let in_stage = entries.iter().filter(|e| e.stage == stage);
            StageColumn {
                stage,
                label: stage_label(stage),
                count: in_stage.clone().count(),
                total_value: in_stage.map(|e| e.value.unwrap_or_default()).sum(),
            }
        })
        .collect()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Tratamento {0} não tem paciente associado")]
    MissingPatient(i64),

    #[error("Informe a data do agendamento (o tratamento {0} não tem prazo)")]
    MissingStartDate(i64),
}

/// Ajustes opcionais na conversão de tratamento em agendamento
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionOptions {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub appointment_type: Option<AppointmentType>,
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Agendamento único criado a partir de um tratamento.
///
/// Sem ajustes, usa o título do tratamento, tipo consulta, o prazo como
/// data e uma nota indicando a origem.
pub fn conversion_appointment(
    entry: &PipelineEntry,
    options: ConversionOptions,
) -> Result<AppointmentFields, ConversionError> {
    let client_id = entry.client_id.ok_or(ConversionError::MissingPatient(entry.id))?;
    let start_date = options
        .start_date
        .or(entry.deadline)
        .ok_or(ConversionError::MissingStartDate(entry.id))?;

    Ok(AppointmentFields {
        client_id,
        title: options.title.unwrap_or_else(|| entry.title.clone()),
        appointment_type: options.appointment_type.unwrap_or_default(),
        day_of_month: None,
        start_date,
        end_date: None,
        recurrence: AppointmentRecurrence::None,
        notes: Some(
            options
                .notes
                .unwrap_or_else(|| format!("Convertido de Tratamento: {}", entry.title)),
        ),
    })
}

/// Etapa a gravar depois da conversão (nenhuma se já estiver fechado)
pub fn stage_after_conversion(entry: &PipelineEntry) -> Option<PipelineStage> {
    (entry.stage != PipelineStage::Closed).then_some(PipelineStage::Closed)
}
