//! Definições de erro para a biblioteca clinic-db
//!
//! Este módulo define os tipos de erro usados pela biblioteca

use thiserror::Error;

/// Erros específicos para operações de banco de dados
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Erro de conexão com banco de dados: {0}")]
    ConnectionError(String),

    #[error("Erro de consulta: {0}")]
    QueryError(String),

    #[error("{entity} não encontrado: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Violação de restrição: {0}")]
    ConstraintViolation(String),

    #[error("Erro interno: {0}")]
    InternalError(String),
}

/// Resultado padrão das operações de repositório
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Conversão de erros específicos do SQLx para nossos tipos de erro
impl From<sqlx::Error> for DbError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DbError::QueryError("Registro não encontrado".to_string()),
            sqlx::Error::Database(dbe) => {
                if dbe.is_foreign_key_violation()
                    || dbe.is_unique_violation()
                    || dbe.is_check_violation()
                {
                    return DbError::ConstraintViolation(dbe.message().to_string());
                }
                // SQLITE_CONSTRAINT e códigos estendidos (NOTNULL, FOREIGNKEY, UNIQUE, CHECK)
                if let Some(code) = dbe.code() {
                    if matches!(code.as_ref(), "19" | "275" | "787" | "1299" | "2067") {
                        return DbError::ConstraintViolation(dbe.message().to_string());
                    }
                }
                DbError::QueryError(dbe.message().to_string())
            }
            sqlx::Error::ColumnNotFound(col) => {
                DbError::QueryError(format!("Coluna não encontrada: {}", col))
            }
            sqlx::Error::TypeNotFound { type_name } => {
                DbError::QueryError(format!("Tipo não encontrado: {}", type_name))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::QueryError(format!("Erro ao decodificar coluna {}: {}", index, source))
            }
            sqlx::Error::Io(io_err) => DbError::ConnectionError(io_err.to_string()),
            sqlx::Error::Configuration(conf_err) => DbError::ConnectionError(conf_err.to_string()),
            sqlx::Error::PoolClosed => {
                DbError::ConnectionError("Pool de conexões fechado".to_string())
            }
            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionError("Timeout no pool de conexões".to_string())
            }
            sqlx::Error::WorkerCrashed => {
                DbError::InternalError("Worker do banco de dados falhou".to_string())
            }
            _ => DbError::InternalError(format!("Erro inesperado: {:?}", error)),
        }
    }
}

impl DbError {
    /// Indica se o erro corresponde a um registro inexistente
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Converte um UPDATE/DELETE que não afetou linhas em `NotFound`
pub(crate) fn expect_affected(rows_affected: u64, entity: &'static str, id: i64) -> DbResult<()> {
    if rows_affected == 0 {
        return Err(DbError::NotFound { entity, id });
    }
    Ok(())
}
