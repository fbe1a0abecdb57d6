//! DDL for the three tables the importer writes.
//!
//! Every statement is `IF NOT EXISTS`, so replaying it against a populated
//! database is a no-op and existing tables are never altered.

use rusqlite::Connection;
use tracing::debug;

use crate::errors::ImportResult;

pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS instruments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        symbol TEXT,
        brsymbol TEXT,
        name TEXT,
        exchange TEXT,
        token TEXT,
        expiry TEXT,
        strike REAL,
        lotsize INTEGER DEFAULT 1,
        instrumenttype TEXT,
        tick_size REAL,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT DEFAULT CURRENT_TIMESTAMP,
        brexchange TEXT
    );",
    "CREATE TABLE IF NOT EXISTS instruments_refresh_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        exchange TEXT NOT NULL,
        status TEXT NOT NULL,
        instrument_count INTEGER NOT NULL DEFAULT 0,
        refresh_started_at TEXT,
        refresh_completed_at TEXT
    );",
    "CREATE INDEX IF NOT EXISTS idx_instruments_symbol ON instruments(symbol);",
    "CREATE INDEX IF NOT EXISTS idx_instruments_exchange ON instruments(exchange);",
    "CREATE INDEX IF NOT EXISTS idx_instruments_type ON instruments(instrumenttype);",
];

/// Search index over `symbol` and `name`. Its rowid mirrors `instruments.id`;
/// the importer fills it explicitly, so it is a plain (not external-content)
/// FTS5 table.
pub const FTS_STATEMENTS: &[&str] = &[
    "CREATE VIRTUAL TABLE IF NOT EXISTS instruments_fts
     USING fts5(symbol, name);",
];

/// Create any missing table or index.
pub fn ensure_schema(conn: &Connection) -> ImportResult<()> {
    for stmt in SCHEMA_STATEMENTS.iter().chain(FTS_STATEMENTS) {
        conn.execute_batch(stmt)?;
    }
    debug!("Schema ensured ({} statements)", SCHEMA_STATEMENTS.len() + FTS_STATEMENTS.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_ensure_schema_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let names = table_names(&conn);
        assert!(names.contains(&"instruments".to_string()));
        assert!(names.contains(&"instruments_fts".to_string()));
        assert!(names.contains(&"instruments_refresh_log".to_string()));
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO instruments (symbol) VALUES ('TCS')", [])
            .unwrap();
        ensure_schema(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM instruments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
