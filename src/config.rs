//! Runtime configuration.
//!
//! Values come from command-line flags, falling back to environment variables
//! and then to built-in defaults.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::db::{self, Database};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5555;

/// Where the SQLite database lives.
#[derive(Args, Clone, Debug, Default, PartialEq)]
pub struct StoreConfig {
    /// Path to the SQLite database file (defaults to the platform data directory)
    #[arg(long, env = "SPACE_MISSIONS_DATABASE")]
    pub database: Option<PathBuf>,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            database: std::env::var_os("SPACE_MISSIONS_DATABASE").map(PathBuf::from),
        }
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => db::default_path(),
        }
    }

    /// Open the configured database and bring its schema up to date.
    pub fn open(&self) -> Result<Database> {
        let path = self.database_path()?;
        tracing::info!("Opening database at {}", path.display());
        let db = Database::open(path)?;
        db.migrate()?;
        Ok(db)
    }
}

/// HTTP server settings.
#[derive(Args, Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "SPACE_MISSIONS_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port for the HTTP API
    #[arg(short, long, env = "SPACE_MISSIONS_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[command(flatten)]
    pub store: StoreConfig,
}

impl ServerConfig {
    /// Configuration used when no subcommand is given.
    pub fn from_env() -> Self {
        let host = std::env::var("SPACE_MISSIONS_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = std::env::var("SPACE_MISSIONS_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            host,
            port,
            store: StoreConfig::from_env(),
        }
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
