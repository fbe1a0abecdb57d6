use std::fs::File;
use std::path::Path;

use csv::{DeserializeRecordsIntoIter, Reader, ReaderBuilder};
use tracing::debug;

use crate::data::validator;
use crate::errors::{ImportError, ImportResult};
use crate::models::instrument::CsvInstrument;

/// Open the source CSV and check its header row.
///
/// Records may carry more fields than the header; the extras are ignored.
pub fn open_reader(path: &Path) -> ImportResult<Reader<File>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    validator::validate_headers(&headers)?;
    Ok(reader)
}

/// Count data rows (header excluded). Reads the file once without decoding
/// fields.
pub fn count_records(path: &Path) -> ImportResult<usize> {
    let mut reader = open_reader(path)?;
    let mut record = csv::ByteRecord::new();
    let mut count = 0usize;
    while reader.read_byte_record(&mut record)? {
        count += 1;
    }
    debug!("Pre-scan of {} found {} records", path.display(), count);
    Ok(count)
}

/// Stream the data rows of the source CSV as raw instrument rows.
pub fn read_instruments(path: &Path) -> ImportResult<DeserializeRecordsIntoIter<File, CsvInstrument>> {
    Ok(open_reader(path)?.into_deserialize())
}
