//! # pizza-cli
//!
//! Console front end for the pizza ordering store.
//!
//! ## Startup
//! ```text
//! init_tracing()          RUST_LOG or "warn,pizza=info,sqlx=warn", to stderr
//!      │
//!      ▼
//! AppConfig::load()       defaults → pizza.toml → DB_* environment
//!      │
//!      ▼
//! Database::new()         pool + embedded migrations
//! Database::initialize()  status vocabulary
//!      │
//!      ▼
//! cli::run_menu()         stdin / stdout until "0" or end of input
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod workflow;

use std::io;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use pizza_db::Database;

pub use error::{AppError, ErrorCode};

const DEFAULT_LOG_FILTER: &str = "warn,pizza=info,sqlx=warn";

/// Runs the console until the operator exits.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db_path = config.database_path();
    info!(?db_path, max_connections = config.max_connections, "Opening database");

    let db = Database::new(config.db_config())
        .await
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    db.initialize().await.context("failed to initialize database")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let outcome = cli::run_menu(&db, stdin.lock(), stdout.lock()).await;

    db.close().await;
    outcome.context("console I/O failed")?;

    info!("Session ended");
    Ok(())
}

/// Logs go to stderr so they never interleave with the menu.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
