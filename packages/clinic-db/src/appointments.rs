//! Operações de agendamentos

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{expect_affected, DbError, DbResult};
use crate::models::{Appointment, AppointmentFields};

const SELECT_APPOINTMENT: &str = r#"
    SELECT a.id, a.client_id, c.name AS client_name, a.title, a.type, a.day_of_month,
           a.start_date, a.end_date, a.recurrence, a.notes, a.created_at
    FROM appointments a
    LEFT JOIN clients c ON a.client_id = c.id
"#;

/// Lista os agendamentos com o nome do paciente, por data de início
pub async fn list_appointments(pool: &SqlitePool) -> DbResult<Vec<Appointment>> {
    let appointments = sqlx::query_as::<_, Appointment>(&format!(
        "{} ORDER BY a.start_date ASC, a.id ASC",
        SELECT_APPOINTMENT
    ))
    .fetch_all(pool)
    .await?;
    debug!("{} agendamentos carregados", appointments.len());
    Ok(appointments)
}

/// Busca um agendamento pelo identificador
pub async fn get_appointment(pool: &SqlitePool, id: i64) -> DbResult<Appointment> {
    sqlx::query_as::<_, Appointment>(&format!("{} WHERE a.id = ?", SELECT_APPOINTMENT))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound { entity: "Agendamento", id })
}

/// Cria um agendamento e retorna o id gerado
pub async fn create_appointment(pool: &SqlitePool, fields: &AppointmentFields) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO appointments (client_id, title, type, day_of_month, start_date, end_date, recurrence, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(fields.client_id)
    .bind(&fields.title)
    .bind(fields.appointment_type.as_str())
    .bind(fields.day_of_month.map(i64::from))
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.recurrence.as_str())
    .bind(&fields.notes)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    info!("Agendamento {} criado ({}, {})", id, fields.appointment_type, fields.recurrence);
    Ok(id)
}

/// Atualiza todos os campos de um agendamento
pub async fn update_appointment(pool: &SqlitePool, id: i64, fields: &AppointmentFields) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE appointments
        SET client_id = ?, title = ?, type = ?, day_of_month = ?, start_date = ?,
            end_date = ?, recurrence = ?, notes = ?
        WHERE id = ?
        "#,
    )
    .bind(fields.client_id)
    .bind(&fields.title)
    .bind(fields.appointment_type.as_str())
    .bind(fields.day_of_month.map(i64::from))
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.recurrence.as_str())
    .bind(&fields.notes)
    .bind(id)
    .execute(pool)
    .await?;

    expect_affected(result.rows_affected(), "Agendamento", id)
}

/// Remove um agendamento
pub async fn delete_appointment(pool: &SqlitePool, id: i64) -> DbResult<()> {
    let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    expect_affected(result.rows_affected(), "Agendamento", id)
}
