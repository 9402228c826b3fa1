//! Utilitários de teste: banco temporário já migrado

use anyhow::Result;
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::{init_db_pool, DbConfig};

/// Cria um banco em diretório temporário.
///
/// O `TempDir` precisa continuar vivo enquanto o pool for usado.
pub async fn temp_pool() -> Result<(TempDir, SqlitePool)> {
    let dir = tempfile::tempdir()?;
    let config = DbConfig {
        db_path: dir.path().join("crm.db").to_string_lossy().to_string(),
        max_connections: 2,
    };
    let pool = init_db_pool(&config).await?;
    Ok((dir, pool))
}
