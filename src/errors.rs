/// All importer errors, categorized by phase.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    // ── Source file ──
    #[error("Invalid CSV format: {0}")]
    InvalidCsvFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file: {0}")]
    FileRead(String),

    #[error("CSV parse error at row {row}: {message}")]
    CsvParseError { row: usize, message: String },

    #[error("Invalid {field} value {value:?} at row {row}")]
    InvalidNumber {
        row: usize,
        field: &'static str,
        value: String,
    },

    // ── Database ──
    #[error("Database error: {0}")]
    Database(String),

    // ── Configuration ──
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Reporting ──
    #[error("Failed to write report: {0}")]
    Report(String),
}

impl ImportError {
    /// Short machine-readable code, logged alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ImportError::InvalidCsvFormat(_) => "INVALID_CSV_FORMAT",
            ImportError::FileNotFound(_) => "FILE_NOT_FOUND",
            ImportError::FileRead(_) => "FILE_READ",
            ImportError::CsvParseError { .. } => "CSV_PARSE_ERROR",
            ImportError::InvalidNumber { .. } => "INVALID_NUMBER",
            ImportError::Database(_) => "DATABASE",
            ImportError::InvalidConfig(_) => "INVALID_CONFIG",
            ImportError::Report(_) => "REPORT",
        }
    }
}

// ── Conversions from external errors ──

impl From<rusqlite::Error> for ImportError {
    fn from(err: rusqlite::Error) -> Self {
        ImportError::Database(err.to_string())
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileRead(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        let row = err
            .position()
            .map(|pos| pos.record() as usize)
            .unwrap_or_default();
        match err.kind() {
            csv::ErrorKind::Io(_) => ImportError::FileRead(err.to_string()),
            _ => ImportError::CsvParseError {
                row,
                message: err.to_string(),
            },
        }
    }
}

pub type ImportResult<T> = Result<T, ImportError>;
