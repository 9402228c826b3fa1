//! Operações de pagamentos

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{expect_affected, DbError, DbResult};
use crate::models::{Payment, PaymentFields, PaymentStatus};

const SELECT_PAYMENT: &str = r#"
    SELECT p.id, p.client_id, c.name AS client_name, p.amount, p.due_date,
           p.status, p.description, p.recurrence, p.end_date, p.created_at
    FROM payments p
    LEFT JOIN clients c ON p.client_id = c.id
"#;

/// Lista os pagamentos com o nome do paciente, por data de vencimento
pub async fn list_payments(pool: &SqlitePool) -> DbResult<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(&format!(
        "{} ORDER BY p.due_date ASC, p.id ASC",
        SELECT_PAYMENT
    ))
    .fetch_all(pool)
    .await?;
    debug!("{} pagamentos carregados", payments.len());
    Ok(payments)
}

/// Busca um pagamento pelo identificador
pub async fn get_payment(pool: &SqlitePool, id: i64) -> DbResult<Payment> {
    sqlx::query_as::<_, Payment>(&format!("{} WHERE p.id = ?", SELECT_PAYMENT))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound { entity: "Pagamento", id })
}

/// Registra um pagamento e retorna o id gerado
pub async fn create_payment(pool: &SqlitePool, fields: &PaymentFields) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO payments (client_id, amount, due_date, status, description, recurrence, end_date)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(fields.client_id)
    .bind(fields.amount)
    .bind(fields.due_date)
    .bind(fields.status.as_str())
    .bind(&fields.description)
    .bind(fields.recurrence.as_str())
    .bind(fields.end_date)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    info!("Pagamento {} registrado (vencimento {})", id, fields.due_date);
    Ok(id)
}

/// Atualiza um pagamento; o status não é alterado aqui
pub async fn update_payment(pool: &SqlitePool, id: i64, fields: &PaymentFields) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE payments
        SET client_id = ?, amount = ?, due_date = ?, description = ?, recurrence = ?, end_date = ?
        WHERE id = ?
        "#,
    )
    .bind(fields.client_id)
    .bind(fields.amount)
    .bind(fields.due_date)
    .bind(&fields.description)
    .bind(fields.recurrence.as_str())
    .bind(fields.end_date)
    .bind(id)
    .execute(pool)
    .await?;

    expect_affected(result.rows_affected(), "Pagamento", id)
}

/// Altera apenas o status de um pagamento
pub async fn set_payment_status(pool: &SqlitePool, id: i64, status: PaymentStatus) -> DbResult<()> {
    let result = sqlx::query("UPDATE payments SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    expect_affected(result.rows_affected(), "Pagamento", id)?;
    info!("Pagamento {} marcado como {}", id, status);
    Ok(())
}

/// Remove um pagamento
pub async fn delete_payment(pool: &SqlitePool, id: i64) -> DbResult<()> {
    let result = sqlx::query("DELETE FROM payments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    expect_affected(result.rows_affected(), "Pagamento", id)
}
