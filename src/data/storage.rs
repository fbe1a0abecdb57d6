use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::errors::{ImportError, ImportResult};
use crate::models::instrument::{Instrument, InstrumentSummary, RefreshLogEntry};

/// Open the database file, creating parent directories when needed.
pub fn open_database(path: &Path) -> ImportResult<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))?;
    Ok(conn)
}

/// Run `f` inside a named SAVEPOINT.
///
/// Outside a transaction the savepoint opens one and `RELEASE` commits it;
/// inside one it only nests. On error the step is rolled back and released
/// before the error is returned.
pub fn with_savepoint<T>(
    conn: &Connection,
    name: &str,
    f: impl FnOnce(&Connection) -> ImportResult<T>,
) -> ImportResult<T> {
    conn.execute_batch(&format!("SAVEPOINT {name};"))?;
    match f(conn) {
        Ok(value) => {
            conn.execute_batch(&format!("RELEASE SAVEPOINT {name};"))?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) =
                conn.execute_batch(&format!("ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name};"))
            {
                warn!("Rollback of savepoint {} failed: {}", name, rollback);
            }
            Err(e)
        }
    }
}

// ── Instruments ──

/// Delete every instrument row. Returns the number of rows removed.
pub fn clear_instruments(conn: &Connection) -> ImportResult<usize> {
    let removed = conn.execute("DELETE FROM instruments", [])?;
    Ok(removed)
}

/// Insert a batch of normalized instruments. Returns the number inserted.
pub fn insert_instruments(conn: &Connection, batch: &[Instrument]) -> ImportResult<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO instruments (
            symbol, brsymbol, name, exchange, token, expiry, strike,
            lotsize, instrumenttype, tick_size, created_at, updated_at, brexchange
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    )?;

    for inst in batch {
        stmt.execute(params![
            inst.symbol,
            inst.brsymbol,
            inst.name,
            inst.exchange,
            inst.token,
            inst.expiry,
            inst.strike,
            inst.lotsize,
            inst.instrumenttype,
            inst.tick_size,
            inst.created_at,
            inst.updated_at,
            inst.brexchange,
        ])?;
    }
    Ok(batch.len())
}

pub fn count_instruments(conn: &Connection) -> ImportResult<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM instruments", [], |row| row.get(0))?;
    Ok(count)
}

/// First `limit` instruments in table order.
pub fn sample_instruments(conn: &Connection, limit: usize) -> ImportResult<Vec<InstrumentSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, symbol, name, exchange, instrumenttype
         FROM instruments
         ORDER BY id
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![limit as i64], row_to_summary)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Instrument counts per exchange, largest first. `None` means all groups.
pub fn count_by_exchange(
    conn: &Connection,
    limit: Option<usize>,
) -> ImportResult<Vec<(Option<String>, i64)>> {
    count_grouped(conn, "exchange", limit)
}

/// Instrument counts per instrument type, largest first.
pub fn count_by_instrument_type(conn: &Connection) -> ImportResult<Vec<(Option<String>, i64)>> {
    count_grouped(conn, "instrumenttype", None)
}

fn count_grouped(
    conn: &Connection,
    column: &'static str,
    limit: Option<usize>,
) -> ImportResult<Vec<(Option<String>, i64)>> {
    // SQLite treats a negative LIMIT as unbounded.
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let sql = format!(
        "SELECT {column}, COUNT(*) AS count
         FROM instruments
         GROUP BY {column}
         ORDER BY count DESC, {column}
         LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![limit], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Search index ──

/// Clear `instruments_fts` and repopulate it from `instruments`, keyed by
/// `instruments.id`. Returns the number of indexed rows.
pub fn rebuild_search_index(conn: &Connection) -> ImportResult<i64> {
    conn.execute("DELETE FROM instruments_fts", [])?;
    let inserted = conn.execute(
        "INSERT INTO instruments_fts(rowid, symbol, name)
         SELECT id, symbol, name FROM instruments",
        [],
    )?;
    debug!("Search index repopulated with {} rows", inserted);
    count_search_index(conn)
}

pub fn count_search_index(conn: &Connection) -> ImportResult<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM instruments_fts", [], |row| row.get(0))?;
    Ok(count)
}

/// Full-text search over symbol and name, best match first.
///
/// Each whitespace-separated term is matched as a quoted prefix, so input such
/// as `NIFTY-I` or `M&M` is never parsed as FTS5 query syntax.
pub fn search_instruments(
    conn: &Connection,
    query: &str,
    limit: usize,
) -> ImportResult<Vec<InstrumentSummary>> {
    let Some(match_expr) = fts_match_expression(query) else {
        return Ok(Vec::new());
    };

    let mut stmt = conn.prepare(
        "SELECT i.id, i.symbol, i.name, i.exchange, i.instrumenttype
         FROM instruments_fts
         JOIN instruments i ON i.id = instruments_fts.rowid
         WHERE instruments_fts MATCH ?1
         ORDER BY instruments_fts.rank
         LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(params![match_expr, limit as i64], row_to_summary)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn fts_match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|term| format!("\"{}\"*", term.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

// ── Refresh log ──

/// Append one row to `instruments_refresh_log`. Returns its id.
pub fn append_refresh_log(conn: &Connection, entry: &RefreshLogEntry) -> ImportResult<i64> {
    conn.execute(
        "INSERT INTO instruments_refresh_log (
            exchange, status, instrument_count, refresh_started_at, refresh_completed_at
        ) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.exchange,
            entry.status,
            entry.instrument_count,
            entry.refresh_started_at,
            entry.refresh_completed_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent refresh-log row, if any.
pub fn latest_refresh_log(conn: &Connection) -> ImportResult<Option<RefreshLogEntry>> {
    conn.query_row(
        "SELECT exchange, status, instrument_count, refresh_started_at, refresh_completed_at
         FROM instruments_refresh_log
         ORDER BY id DESC
         LIMIT 1",
        [],
        |row| {
            Ok(RefreshLogEntry {
                exchange: row.get(0)?,
                status: row.get(1)?,
                instrument_count: row.get(2)?,
                refresh_started_at: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                refresh_completed_at: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            })
        },
    )
    .optional()
    .map_err(ImportError::from)
}

fn row_to_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<InstrumentSummary> {
    Ok(InstrumentSummary {
        id: row.get(0)?,
        symbol: row.get(1)?,
        name: row.get(2)?,
        exchange: row.get(3)?,
        instrumenttype: row.get(4)?,
    })
}
