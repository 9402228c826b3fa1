//! Operações do funil de tratamentos (tabela `process_pipelines`)

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{expect_affected, DbError, DbResult};
use crate::models::{PipelineEntry, PipelineEntryFields, PipelineStage};

const SELECT_ENTRY: &str = r#"
    SELECT p.id, p.client_id, c.name AS client_name, p.title, p.status, p.stage,
           p.value, p.deadline, p.created_at
    FROM process_pipelines p
    LEFT JOIN clients c ON p.client_id = c.id
"#;

/// Lista os tratamentos, mais recentes primeiro
pub async fn list_entries(pool: &SqlitePool) -> DbResult<Vec<PipelineEntry>> {
    let entries = sqlx::query_as::<_, PipelineEntry>(&format!(
        "{} ORDER BY p.created_at DESC, p.id DESC",
        SELECT_ENTRY
    ))
    .fetch_all(pool)
    .await?;
    debug!("{} tratamentos carregados", entries.len());
    Ok(entries)
}

/// Busca um tratamento pelo identificador
pub async fn get_entry(pool: &SqlitePool, id: i64) -> DbResult<PipelineEntry> {
    sqlx::query_as::<_, PipelineEntry>(&format!("{} WHERE p.id = ?", SELECT_ENTRY))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound { entity: "Tratamento", id })
}

/// Cria um tratamento e retorna o id gerado
pub async fn create_entry(pool: &SqlitePool, fields: &PipelineEntryFields) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO process_pipelines (client_id, title, status, stage, value, deadline)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(fields.client_id)
    .bind(&fields.title)
    .bind(fields.status.as_str())
    .bind(fields.stage.as_str())
    .bind(fields.value)
    .bind(fields.deadline)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    info!("Tratamento {} criado na etapa {}", id, fields.stage);
    Ok(id)
}

/// Atualiza paciente, título, valor e prazo; etapa e status legado ficam intactos
pub async fn update_entry(pool: &SqlitePool, id: i64, fields: &PipelineEntryFields) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE process_pipelines
        SET client_id = ?, title = ?, value = ?, deadline = ?
        WHERE id = ?
        "#,
    )
    .bind(fields.client_id)
    .bind(&fields.title)
    .bind(fields.value)
    .bind(fields.deadline)
    .bind(id)
    .execute(pool)
    .await?;

    expect_affected(result.rows_affected(), "Tratamento", id)
}

/// Altera apenas a etapa de um tratamento
pub async fn set_entry_stage(pool: &SqlitePool, id: i64, stage: PipelineStage) -> DbResult<()> {
    let result = sqlx::query("UPDATE process_pipelines SET stage = ? WHERE id = ?")
        .bind(stage.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    expect_affected(result.rows_affected(), "Tratamento", id)?;
    info!("Tratamento {} movido para {}", id, stage);
    Ok(())
}

/// Remove um tratamento
pub async fn delete_entry(pool: &SqlitePool, id: i64) -> DbResult<()> {
    let result = sqlx::query("DELETE FROM process_pipelines WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    expect_affected(result.rows_affected(), "Tratamento", id)
}
