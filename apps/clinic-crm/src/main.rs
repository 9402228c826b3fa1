//! Clinic CRM - ponto de entrada

use anyhow::{Context, Result};
use clap::Parser;
use clinic_crm::config::Args;
use clinic_crm::{build_router, built_info, telemetry, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_tracing(args.log_format);

    info!(
        "Iniciando {} {} ({})",
        built_info::PKG_NAME,
        built_info::PKG_VERSION,
        built_info::PROFILE
    );

    let pool = clinic_db::init_db_pool(&args.db_config())
        .await
        .context("Falha ao inicializar o banco de dados")?;

    let app = build_router(AppState::new(pool.clone()));
    let addr = args.socket_addr();

    info!("Servidor HTTP escutando em {}", addr);
    axum::Server::try_bind(&addr)
        .with_context(|| format!("Falha ao abrir a porta {}", addr))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Falha no servidor HTTP")?;

    pool.close().await;
    info!("Servidor encerrado");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao aguardar Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Sinal de encerramento recebido");
}
