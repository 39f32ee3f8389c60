pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod forecast;
pub mod geo;
pub mod matching;
pub mod models;
pub mod notify;
pub mod risk;
pub mod session;
pub mod telemetry;

use std::path::Path;

use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use crate::db::StorageError;

/// Initialize tracing from RUST_LOG, falling back to the default
/// filter. Safe to call once at startup.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}

/// Open (and migrate) the database at `path`, seeding the demo stores
/// and stock when the store table is empty.
pub fn bootstrap(path: &Path) -> Result<Connection, StorageError> {
    let conn = db::open_database(path)?;
    catalog::seed_demo_data(&conn)?;
    Ok(conn)
}
