pub mod commands;
pub mod data;
pub mod errors;
pub mod models;
pub mod utils;

use std::io;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::errors::ImportResult;
use crate::models::config::ImportConfig;
use crate::models::instrument::ImportSummary;

/// Install the global tracing subscriber. Diagnostics go to stderr so stdout
/// carries only the import report.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

/// Run one import, printing the report to stdout.
pub fn run(config: &ImportConfig) -> ImportResult<ImportSummary> {
    info!(
        "Starting instruments import: {} -> {}",
        config.source_path.display(),
        config.database_path.display()
    );
    let stdout = io::stdout();
    commands::import_instruments(config, stdout.lock())
}
