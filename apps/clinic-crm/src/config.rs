//! Configuração do serviço via linha de comando e variáveis de ambiente

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::{Parser, ValueEnum};
use clinic_db::DbConfig;

/// Formato dos logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Argumentos do clinic-crm
#[derive(Parser, Debug, Clone)]
#[command(name = "clinic-crm")]
#[command(about = "Serviço local do CRM da clínica")]
#[command(version)]
pub struct Args {
    /// Caminho do arquivo SQLite
    #[arg(long, default_value = "data/crm.db", env = "CLINIC_CRM_DB_PATH")]
    pub db_path: String,

    /// Endereço de escuta
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST), env = "CLINIC_CRM_HOST")]
    pub host: IpAddr,

    /// Porta de escuta
    #[arg(short, long, default_value_t = 8080, env = "CLINIC_CRM_PORT")]
    pub port: u16,

    /// Máximo de conexões no pool do SQLite
    #[arg(long, default_value_t = 5, env = "CLINIC_CRM_MAX_CONNECTIONS")]
    pub max_connections: u32,

    /// Formato dos logs
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, env = "CLINIC_CRM_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Args {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            db_path: self.db_path.clone(),
            max_connections: self.max_connections,
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
