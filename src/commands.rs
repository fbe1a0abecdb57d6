use std::io::Write;

use chrono::Local;
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::data::{loader, schema, storage, transform};
use crate::errors::ImportResult;
use crate::models::config::{CommitMode, ImportConfig};
use crate::models::instrument::{
    ImportSummary, Instrument, RefreshLogEntry, CSV_UPLOAD_EXCHANGE, STATUS_COMPLETED,
};
use crate::utils::report::Reporter;

/// Rows shown in the post-import sample.
pub const SAMPLE_SIZE: usize = 5;

/// Exchanges listed in the post-import breakdown.
pub const TOP_EXCHANGES: usize = 10;

// ── Import Command ──

/// Replace the contents of `instruments` with the rows of the source CSV,
/// rebuild `instruments_fts`, append a refresh-log entry and print a report.
///
/// The source file is pre-scanned (row count, header check) before the
/// database is opened, so a missing or malformed header leaves the table
/// untouched. The connection is closed on every return path.
pub fn import_instruments<W: Write>(config: &ImportConfig, out: W) -> ImportResult<ImportSummary> {
    config.validate()?;
    let started_at = timestamp_now();
    let mut report = Reporter::new(out);
    report.banner()?;

    // 1. Pre-scan the CSV
    let total = loader::count_records(&config.source_path)?;
    info!(
        "Source {} holds {} records",
        config.source_path.display(),
        total
    );

    // 2. Open the database
    let conn = storage::open_database(&config.database_path)?;
    if config.create_schema {
        schema::ensure_schema(&conn)?;
    }
    info!(
        "Database ready at {} (commit mode: {})",
        config.database_path.display(),
        config.commit_mode
    );

    // 3. Clear, load, index, log
    let summary = match config.commit_mode {
        CommitMode::PerBatch => load(&conn, config, total, &started_at, &mut report)?,
        CommitMode::Atomic => {
            let tx = conn.unchecked_transaction()?;
            let summary = load(&tx, config, total, &started_at, &mut report)?;
            tx.commit()?;
            summary
        }
    };

    // 4. Report
    report_summary(&conn, &summary, &mut report)?;
    conn.close().map_err(|(_, e)| e)?;

    info!(
        "Import complete: {} instruments, {} search rows",
        summary.instrument_count, summary.fts_count
    );
    Ok(summary)
}

fn load<W: Write>(
    conn: &Connection,
    config: &ImportConfig,
    total: usize,
    started_at: &str,
    report: &mut Reporter<W>,
) -> ImportResult<ImportSummary> {
    report.clearing()?;
    let removed = storage::clear_instruments(conn)?;
    info!("Cleared {} existing instruments", removed);
    report.cleared(removed)?;

    report.reading(&config.source_path, total)?;
    let inserted = insert_all(conn, config, total, report)?;
    if inserted != total {
        warn!(
            "Pre-scan counted {} records but {} were imported",
            total, inserted
        );
    }
    report.import_finished(inserted)?;

    let instrument_count = storage::count_instruments(conn)?;
    report.instrument_total(instrument_count)?;

    report.rebuilding_search_index()?;
    let fts_count = storage::with_savepoint(conn, "rebuild_fts", storage::rebuild_search_index)?;
    info!("Search index rebuilt with {} rows", fts_count);
    report.search_index_rebuilt(fts_count)?;

    let refresh_log = RefreshLogEntry {
        exchange: CSV_UPLOAD_EXCHANGE.to_string(),
        status: STATUS_COMPLETED.to_string(),
        instrument_count,
        refresh_started_at: started_at.to_string(),
        refresh_completed_at: timestamp_now(),
    };
    storage::append_refresh_log(conn, &refresh_log)?;
    report.refresh_logged()?;

    Ok(ImportSummary {
        source_rows: total,
        instrument_count,
        fts_count,
        refresh_log,
    })
}

/// Stream the CSV through the transform and insert it in committed batches.
/// Returns the number of rows inserted.
fn insert_all<W: Write>(
    conn: &Connection,
    config: &ImportConfig,
    total: usize,
    report: &mut Reporter<W>,
) -> ImportResult<usize> {
    let mut batch: Vec<Instrument> = Vec::with_capacity(config.batch_size);
    let mut processed = 0usize;
    let mut timestamp = timestamp_now();

    for (idx, record) in loader::read_instruments(&config.source_path)?.enumerate() {
        let raw = record?;
        batch.push(transform::normalize(raw, idx + 1, &timestamp)?);

        if batch.len() == config.batch_size {
            processed += commit_batch(conn, &batch)?;
            batch.clear();
            report.batch_committed(processed, total)?;
            timestamp = timestamp_now();
        }
    }

    if !batch.is_empty() {
        processed += commit_batch(conn, &batch)?;
        report.batch_committed(processed, total)?;
    }

    Ok(processed)
}

fn commit_batch(conn: &Connection, batch: &[Instrument]) -> ImportResult<usize> {
    let inserted =
        storage::with_savepoint(conn, "instrument_batch", |c| storage::insert_instruments(c, batch))?;
    debug!("Committed batch of {} instruments", inserted);
    Ok(inserted)
}

fn report_summary<W: Write>(
    conn: &Connection,
    summary: &ImportSummary,
    report: &mut Reporter<W>,
) -> ImportResult<()> {
    report.sample(&storage::sample_instruments(conn, SAMPLE_SIZE)?)?;
    report.breakdown(
        "Instruments by exchange (top 10):",
        &storage::count_by_exchange(conn, Some(TOP_EXCHANGES))?,
    )?;
    report.breakdown(
        "Instruments by type:",
        &storage::count_by_instrument_type(conn)?,
    )?;
    report.completed(summary.instrument_count, summary.fts_count)
}

// ── Helpers ──

/// Local time in ISO 8601 with microseconds, e.g. `2024-11-20T10:15:00.123456`.
fn timestamp_now() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
