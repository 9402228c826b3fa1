//! Sistema de migrações para banco de dados
//!
//! Este módulo gerencia as migrações do banco de dados SQLite. Os nomes de
//! tabelas e colunas seguem o `crm.db` da versão desktop, de modo que um
//! arquivo existente pode ser aberto sem conversão.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, error, info};

/// Lista de migrações SQL a serem aplicadas
const MIGRATIONS: &[&str] = &[
    // 001_initial_schema.sql
    r#"
    -- Pacientes
    CREATE TABLE IF NOT EXISTS clients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        phone TEXT,
        email TEXT,
        address TEXT,
        notes TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );

    -- Pagamentos
    CREATE TABLE IF NOT EXISTS payments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER,
        amount REAL,
        due_date TEXT,
        status TEXT DEFAULT 'pending',
        description TEXT,
        recurrence TEXT,
        end_date TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (client_id) REFERENCES clients (id)
    );

    -- Funil de tratamentos
    CREATE TABLE IF NOT EXISTS process_pipelines (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER,
        title TEXT NOT NULL,
        status TEXT DEFAULT 'todo',
        stage TEXT DEFAULT 'lead',
        value REAL,
        deadline TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (client_id) REFERENCES clients (id)
    );

    -- Agendamentos
    CREATE TABLE IF NOT EXISTS appointments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER,
        title TEXT NOT NULL,
        type TEXT DEFAULT 'consulta',
        day_of_month INTEGER,
        start_date TEXT,
        end_date TEXT,
        recurrence TEXT DEFAULT 'none',
        notes TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (client_id) REFERENCES clients (id)
    );
    "#,

    // 002_indexes.sql
    r#"
    CREATE INDEX IF NOT EXISTS idx_payments_client_id ON payments (client_id);
    CREATE INDEX IF NOT EXISTS idx_payments_due_date ON payments (due_date);
    CREATE INDEX IF NOT EXISTS idx_process_pipelines_client_id ON process_pipelines (client_id);
    CREATE INDEX IF NOT EXISTS idx_appointments_client_id ON appointments (client_id);
    CREATE INDEX IF NOT EXISTS idx_appointments_start_date ON appointments (start_date);
    "#,
];

/// Executa todas as migrações pendentes no banco de dados
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Aplicando migrações de banco de dados...");

    // Obter a versão atual do banco de dados
    let mut version: i64 = 0;
    match sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await
    {
        Ok(v) => version = v,
        Err(e) => {
            error!("Erro ao obter versão do banco: {}", e);
            // Continuar mesmo assim, pois pode ser a primeira execução
        }
    }

    info!("Versão atual do banco: {}", version);

    for (i, migration_sql) in MIGRATIONS.iter().enumerate() {
        let migration_version = (i + 1) as i64;

        if migration_version <= version {
            debug!("Migração {} já aplicada", migration_version);
            continue;
        }

        info!("Aplicando migração {}...", migration_version);

        let mut transaction = pool
            .begin()
            .await
            .with_context(|| format!("Falha ao iniciar transação para migração {}", migration_version))?;

        sqlx::query(migration_sql)
            .execute(&mut *transaction)
            .await
            .with_context(|| format!("Falha ao executar migração {}", migration_version))?;

        sqlx::query(&format!("PRAGMA user_version = {}", migration_version))
            .execute(&mut *transaction)
            .await
            .with_context(|| format!("Falha ao atualizar versão para {}", migration_version))?;

        transaction
            .commit()
            .await
            .with_context(|| format!("Falha ao confirmar transação para migração {}", migration_version))?;

        info!("Migração {} aplicada com sucesso", migration_version);
    }

    ensure_payment_end_date(pool).await?;

    info!("Migrações concluídas. Versão atual: {}", MIGRATIONS.len());
    Ok(())
}

/// Acrescenta `payments.end_date` em bancos criados antes da coluna existir.
///
/// Roda a cada inicialização; "coluna duplicada" é o caso normal e é ignorado.
async fn ensure_payment_end_date(pool: &SqlitePool) -> Result<()> {
    match sqlx::query("ALTER TABLE payments ADD COLUMN end_date TEXT")
        .execute(pool)
        .await
    {
        Ok(_) => {
            info!("Coluna payments.end_date adicionada");
            Ok(())
        }
        Err(sqlx::Error::Database(dbe)) if dbe.message().contains("duplicate column") => {
            debug!("Coluna payments.end_date já existe");
            Ok(())
        }
        Err(e) => Err(e).context("Falha ao adicionar coluna payments.end_date"),
    }
}
