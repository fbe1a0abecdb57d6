use serde::Deserialize;

/// Exchange tag recorded in the refresh log for CSV imports.
pub const CSV_UPLOAD_EXCHANGE: &str = "CSV_UPLOAD";

/// Status recorded in the refresh log for a finished import.
pub const STATUS_COMPLETED: &str = "completed";

/// One row of the source CSV, exactly as read. The `id` column is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsvInstrument {
    pub symbol: String,
    pub brsymbol: String,
    pub name: String,
    pub exchange: String,
    pub brexchange: String,
    pub token: String,
    pub expiry: String,
    pub strike: String,
    pub lotsize: String,
    pub instrumenttype: String,
    pub tick_size: String,
}

/// A normalized instrument, ready for `instruments`.
///
/// Field order follows the table's column order, with `brexchange` last.
#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub symbol: Option<String>,
    pub brsymbol: Option<String>,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub token: Option<String>,
    pub expiry: Option<String>,
    pub strike: Option<f64>,
    pub lotsize: i64,
    pub instrumenttype: Option<String>,
    pub tick_size: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
    pub brexchange: Option<String>,
}

/// The columns shown in the post-import sample and returned by search.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSummary {
    pub id: i64,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub instrumenttype: Option<String>,
}

/// One appended row of `instruments_refresh_log`.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshLogEntry {
    pub exchange: String,
    pub status: String,
    pub instrument_count: i64,
    pub refresh_started_at: String,
    pub refresh_completed_at: String,
}

/// Final numbers of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub source_rows: usize,
    pub instrument_count: i64,
    pub fts_count: i64,
    pub refresh_log: RefreshLogEntry,
}
