use csv::StringRecord;

use crate::errors::{ImportError, ImportResult};

/// Columns the source CSV must carry. A leading `id` column may also be
/// present and is ignored.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "symbol",
    "brsymbol",
    "name",
    "exchange",
    "brexchange",
    "token",
    "expiry",
    "strike",
    "lotsize",
    "instrumenttype",
    "tick_size",
];

/// Check that every required column is in the header row.
pub fn validate_headers(headers: &StringRecord) -> ImportResult<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::InvalidCsvFormat(format!(
            "missing column(s): {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_header_accepted() {
        let headers = StringRecord::from(vec![
            "id", "symbol", "brsymbol", "name", "exchange", "brexchange", "token", "expiry",
            "strike", "lotsize", "instrumenttype", "tick_size",
        ]);
        assert!(validate_headers(&headers).is_ok());
    }

    #[test]
    fn test_missing_columns_listed() {
        let headers = StringRecord::from(vec!["id", "symbol", "name", "exchange"]);
        let err = validate_headers(&headers).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid CSV format: missing column(s): brsymbol, brexchange, token, expiry, \
             strike, lotsize, instrumenttype, tick_size"
        );
    }
}
