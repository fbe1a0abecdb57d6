use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use instrument_importer_lib::models::config::{
    CommitMode, ImportConfig, DEFAULT_BATCH_SIZE, DEFAULT_DATABASE_PATH, DEFAULT_SOURCE_PATH,
};

#[derive(Parser, Debug)]
#[command(
    name = "import-instruments",
    about = "Replace the instruments table with the contents of a symbols CSV"
)]
struct Args {
    /// Instrument master CSV to import.
    #[arg(long = "csv", default_value = DEFAULT_SOURCE_PATH)]
    source_path: PathBuf,

    /// SQLite database holding the instruments table.
    #[arg(long = "db", default_value = DEFAULT_DATABASE_PATH)]
    database_path: PathBuf,

    /// Rows committed per batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Run the whole import in a single transaction.
    #[arg(long)]
    atomic: bool,

    /// Do not create missing tables before importing.
    #[arg(long)]
    no_create_schema: bool,
}

impl From<Args> for ImportConfig {
    fn from(args: Args) -> Self {
        ImportConfig {
            source_path: args.source_path,
            database_path: args.database_path,
            batch_size: args.batch_size,
            commit_mode: if args.atomic {
                CommitMode::Atomic
            } else {
                CommitMode::PerBatch
            },
            create_schema: !args.no_create_schema,
        }
    }
}

fn main() -> ExitCode {
    instrument_importer_lib::init_tracing();
    let config = ImportConfig::from(Args::parse());

    let status = exit_status(import(&config), &mut io::stderr());
    ExitCode::from(status)
}

/// Process status for an import outcome: 0 on success, 1 on failure with the
/// message and cause chain written to `err`.
fn exit_status(result: anyhow::Result<()>, err: &mut impl Write) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(err, "\n❌ Import failed: {e:#}");
            let _ = writeln!(err, "{e:?}");
            1
        }
    }
}

fn import(config: &ImportConfig) -> anyhow::Result<()> {
    instrument_importer_lib::run(config)
        .map_err(|e| {
            error!(code = e.code(), "{}", e);
            e
        })
        .with_context(|| {
            format!(
                "importing {} into {}",
                config.source_path.display(),
                config.database_path.display()
            )
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;
    use instrument_importer_lib::errors::ImportError;

    #[test]
    fn test_success_exits_zero_silently() {
        let mut err = Vec::new();
        assert_eq!(exit_status(Ok(()), &mut err), 0);
        assert!(err.is_empty());
    }

    #[test]
    fn test_failure_exits_one_with_cause_chain() {
        let failure = Err(ImportError::FileNotFound("oasymbols.csv".to_string()))
            .context("importing oasymbols.csv into database/simplifyed.db");
        let mut err = Vec::new();
        assert_eq!(exit_status(failure, &mut err), 1);

        let text = String::from_utf8(err).unwrap();
        assert!(text.contains(
            "Import failed: importing oasymbols.csv into database/simplifyed.db: \
             File not found: oasymbols.csv"
        ));
        assert!(text.contains("Caused by:"));
    }

    #[test]
    fn test_plain_error_exits_one() {
        let mut err = Vec::new();
        assert_eq!(exit_status(Err(anyhow!("disk full")), &mut err), 1);
        assert!(String::from_utf8(err).unwrap().contains("Import failed: disk full"));
    }

    #[test]
    fn test_atomic_flag_selects_commit_mode() {
        let args = Args::parse_from(["import-instruments", "--atomic", "--batch-size", "50"]);
        let config = ImportConfig::from(args);
        assert_eq!(config.commit_mode, CommitMode::Atomic);
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.source_path, PathBuf::from(DEFAULT_SOURCE_PATH));
        assert!(config.create_schema);
    }
}
