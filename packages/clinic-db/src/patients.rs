//! Operações de pacientes (tabela `clients`)

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{expect_affected, DbError, DbResult};
use crate::models::{Patient, PatientFields};

const SELECT_PATIENT: &str = r#"
    SELECT id, name, phone, email, address, notes, created_at
    FROM clients
"#;

/// Lista todos os pacientes em ordem alfabética
pub async fn list_patients(pool: &SqlitePool) -> DbResult<Vec<Patient>> {
    let patients = sqlx::query_as::<_, Patient>(&format!("{} ORDER BY name ASC", SELECT_PATIENT))
        .fetch_all(pool)
        .await?;
    debug!("{} pacientes carregados", patients.len());
    Ok(patients)
}

/// Busca um paciente pelo identificador
pub async fn get_patient(pool: &SqlitePool, id: i64) -> DbResult<Patient> {
    sqlx::query_as::<_, Patient>(&format!("{} WHERE id = ?", SELECT_PATIENT))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound { entity: "Paciente", id })
}

/// Cadastra um paciente e retorna o id gerado
pub async fn create_patient(pool: &SqlitePool, fields: &PatientFields) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO clients (name, phone, email, address, notes)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.phone)
    .bind(&fields.email)
    .bind(&fields.address)
    .bind(&fields.notes)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    info!("Paciente {} cadastrado", id);
    Ok(id)
}

/// Atualiza todos os campos editáveis de um paciente
pub async fn update_patient(pool: &SqlitePool, id: i64, fields: &PatientFields) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE clients
        SET name = ?, phone = ?, email = ?, address = ?, notes = ?
        WHERE id = ?
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.phone)
    .bind(&fields.email)
    .bind(&fields.address)
    .bind(&fields.notes)
    .bind(id)
    .execute(pool)
    .await?;

    expect_affected(result.rows_affected(), "Paciente", id)
}

/// Remove um paciente.
///
/// Com as chaves estrangeiras ativas, falha com `ConstraintViolation`
/// enquanto houver pagamentos, tratamentos ou agendamentos vinculados.
pub async fn delete_patient(pool: &SqlitePool, id: i64) -> DbResult<()> {
    let result = sqlx::query("DELETE FROM clients WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    expect_affected(result.rows_affected(), "Paciente", id)?;
    info!("Paciente {} removido", id);
    Ok(())
}
