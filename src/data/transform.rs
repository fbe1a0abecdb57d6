use std::str::FromStr;

use crate::errors::{ImportError, ImportResult};
use crate::models::instrument::{CsvInstrument, Instrument};

/// Literal the source uses for "no value" in numeric and expiry columns.
pub const SENTINEL: &str = "-1";

/// Lot size stored when the source has none.
pub const DEFAULT_LOT_SIZE: i64 = 1;

/// Map one CSV row onto the `instruments` column layout.
///
/// `row` is the 1-based data row number (header excluded) and only feeds error
/// messages. `timestamp` is written to both `created_at` and `updated_at`.
pub fn normalize(raw: CsvInstrument, row: usize, timestamp: &str) -> ImportResult<Instrument> {
    let strike = parse_optional::<f64>(&raw.strike, row, "strike")?;
    let tick_size = parse_optional::<f64>(&raw.tick_size, row, "tick_size")?;
    let lotsize = parse_optional::<i64>(&raw.lotsize, row, "lotsize")?.unwrap_or(DEFAULT_LOT_SIZE);

    Ok(Instrument {
        symbol: non_empty(raw.symbol),
        brsymbol: non_empty(raw.brsymbol),
        name: non_empty(raw.name),
        exchange: non_empty(raw.exchange),
        token: non_empty(raw.token),
        expiry: non_sentinel(raw.expiry),
        strike,
        lotsize,
        instrumenttype: non_empty(raw.instrumenttype),
        tick_size,
        created_at: timestamp.to_string(),
        updated_at: timestamp.to_string(),
        brexchange: non_empty(raw.brexchange),
    })
}

/// Empty string becomes `None`.
pub fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Empty string or the `-1` sentinel becomes `None`.
pub fn non_sentinel(value: String) -> Option<String> {
    if is_absent(&value) {
        None
    } else {
        Some(value)
    }
}

fn is_absent(value: &str) -> bool {
    value.is_empty() || value == SENTINEL
}

/// Parse a numeric column, treating empty and `-1` as absent. Any other value
/// that does not parse fails the whole import.
fn parse_optional<T: FromStr>(
    value: &str,
    row: usize,
    field: &'static str,
) -> ImportResult<Option<T>> {
    if is_absent(value) {
        return Ok(None);
    }
    value
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ImportError::InvalidNumber {
            row,
            field,
            value: value.to_string(),
        })
}
