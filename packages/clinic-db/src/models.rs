//! Modelos de dados do CRM
//!
//! Este módulo define os registros persistidos (pacientes, pagamentos,
//! tratamentos do pipeline e agendamentos), os conjuntos de campos usados
//! para criação/edição e os enums armazenados como texto no SQLite.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use thiserror::Error;
use tracing::warn;

/// Formato das datas de calendário gravadas no banco
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Valor de texto que não corresponde a nenhuma variante conhecida
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Valor inválido para {kind}: {value}")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

/// Gera um enum persistido como texto, com `as_str`, `Display` e `FromStr`.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Todas as variantes, na ordem de declaração
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Representação gravada no banco
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownValue {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Situação de um pagamento
    ///
    /// `Overdue` nunca é atribuído automaticamente; a interface só alterna
    /// entre pendente e pago.
    pub enum PaymentStatus {
        Pending => "pending",
        Paid => "paid",
        Overdue => "overdue",
    }
}

impl PaymentStatus {
    /// Alternância usada pela lista de pagamentos: pago volta a pendente,
    /// qualquer outro estado passa a pago.
    pub fn toggled(self) -> Self {
        match self {
            PaymentStatus::Paid => PaymentStatus::Pending,
            PaymentStatus::Pending | PaymentStatus::Overdue => PaymentStatus::Paid,
        }
    }
}

text_enum! {
    /// Recorrência de um pagamento
    pub enum PaymentRecurrence {
        None => "none",
        Monthly => "monthly",
        /// Armazenado, mas projetado como pagamento único
        Yearly => "yearly",
    }
}

text_enum! {
    /// Recorrência de um agendamento
    pub enum AppointmentRecurrence {
        None => "none",
        /// Aceito pelo esquema, não expandido no calendário
        Weekly => "weekly",
        Monthly => "monthly",
    }
}

text_enum! {
    /// Categoria clínica do agendamento
    pub enum AppointmentType {
        Consulta => "consulta",
        Manutencao => "manutencao",
        Procedimento => "procedimento",
        Retorno => "retorno",
    }
}

text_enum! {
    /// Etapa do funil de tratamentos, em ordem
    pub enum PipelineStage {
        Lead => "lead",
        Contact => "contact",
        Proposal => "proposal",
        Negotiation => "negotiation",
        Closed => "closed",
    }
}

text_enum! {
    /// Status legado dos tratamentos (gravado, nunca interpretado)
    pub enum PipelineStatus {
        Todo => "todo",
        InProgress => "in-progress",
        Done => "done",
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl Default for PaymentRecurrence {
    fn default() -> Self {
        PaymentRecurrence::None
    }
}

impl Default for AppointmentRecurrence {
    fn default() -> Self {
        AppointmentRecurrence::None
    }
}

impl Default for AppointmentType {
    fn default() -> Self {
        AppointmentType::Consulta
    }
}

impl Default for PipelineStage {
    fn default() -> Self {
        PipelineStage::Lead
    }
}

impl Default for PipelineStatus {
    fn default() -> Self {
        PipelineStatus::Todo
    }
}

/// Interpreta uma data `AAAA-MM-DD` como data de calendário local.
///
/// Retorna `None` para textos malformados; o chamador decide se isso
/// significa omitir o registro.
pub fn parse_local_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Lê um enum gravado como texto; NULL (ou texto vazio) vira o valor padrão
fn decode_text_or_default<T>(row: &SqliteRow, column: &str) -> sqlx::Result<T>
where
    T: FromStr<Err = UnknownValue> + Default,
{
    let raw: Option<String> = row.try_get(column)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(value) => value.parse().map_err(|e: UnknownValue| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        }),
    }
}

fn decode_date(row: &SqliteRow, column: &str) -> sqlx::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.try_get(column)?;
    Ok(match raw.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => {
            let parsed = parse_local_date(value);
            if parsed.is_none() {
                warn!("Data malformada na coluna {}: {:?}", column, value);
            }
            parsed
        }
    })
}

/// Paciente (tabela `clients`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl FromRow<'_, SqliteRow> for Patient {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            address: row.try_get("address")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Campos editáveis de um paciente
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientFields {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// Pagamento com o nome do paciente associado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub client_id: Option<i64>,
    /// Nome do paciente (LEFT JOIN, ausente para registros órfãos)
    pub client_name: Option<String>,
    pub amount: f64,
    /// Data de vencimento; `None` quando ausente ou malformada
    pub due_date: Option<NaiveDate>,
    pub status: PaymentStatus,
    pub description: Option<String>,
    pub recurrence: PaymentRecurrence,
    /// Limite superior (inclusivo) da recorrência
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

impl FromRow<'_, SqliteRow> for Payment {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            client_name: row.try_get("client_name")?,
            amount: row.try_get::<Option<f64>, _>("amount")?.unwrap_or_default(),
            due_date: decode_date(row, "due_date")?,
            status: decode_text_or_default(row, "status")?,
            description: row.try_get("description")?,
            recurrence: decode_text_or_default(row, "recurrence")?,
            end_date: decode_date(row, "end_date")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Campos de criação de um pagamento
///
/// Na edição o status é ignorado; ele muda apenas por
/// `payments::set_status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentFields {
    pub client_id: i64,
    pub amount: f64,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: PaymentStatus,
    pub description: Option<String>,
    #[serde(default)]
    pub recurrence: PaymentRecurrence,
    pub end_date: Option<NaiveDate>,
}

/// Tratamento/oportunidade no funil
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEntry {
    pub id: i64,
    pub client_id: Option<i64>,
    pub client_name: Option<String>,
    pub title: String,
    pub status: PipelineStatus,
    pub stage: PipelineStage,
    /// Valor estimado
    pub value: Option<f64>,
    pub deadline: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

impl FromRow<'_, SqliteRow> for PipelineEntry {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            client_name: row.try_get("client_name")?,
            title: row.try_get("title")?,
            status: decode_text_or_default(row, "status")?,
            stage: decode_text_or_default(row, "stage")?,
            value: row.try_get("value")?,
            deadline: decode_date(row, "deadline")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Campos de um tratamento
///
/// Na edição apenas paciente, título, valor e prazo são gravados.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEntryFields {
    pub client_id: i64,
    pub title: String,
    #[serde(default)]
    pub status: PipelineStatus,
    #[serde(default)]
    pub stage: PipelineStage,
    pub value: Option<f64>,
    pub deadline: Option<NaiveDate>,
}

/// Agendamento com o nome do paciente associado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub client_id: Option<i64>,
    pub client_name: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    /// Dia do mês (1-31), usado apenas na recorrência mensal
    pub day_of_month: Option<u32>,
    /// Data do atendimento único, ou início da recorrência mensal
    pub start_date: Option<NaiveDate>,
    /// Limite superior (inclusivo) da recorrência
    pub end_date: Option<NaiveDate>,
    pub recurrence: AppointmentRecurrence,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl FromRow<'_, SqliteRow> for Appointment {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let day_of_month: Option<i64> = row.try_get("day_of_month")?;
        Ok(Self {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            client_name: row.try_get("client_name")?,
            title: row.try_get("title")?,
            appointment_type: decode_text_or_default(row, "type")?,
            day_of_month: day_of_month.and_then(|d| u32::try_from(d).ok()),
            start_date: decode_date(row, "start_date")?,
            end_date: decode_date(row, "end_date")?,
            recurrence: decode_text_or_default(row, "recurrence")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Campos de um agendamento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentFields {
    pub client_id: i64,
    pub title: String,
    #[serde(rename = "type", default)]
    pub appointment_type: AppointmentType,
    pub day_of_month: Option<u32>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub recurrence: AppointmentRecurrence,
    pub notes: Option<String>,
}
