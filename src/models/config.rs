use std::path::PathBuf;

use crate::errors::{ImportError, ImportResult};

/// Rows committed together when no batch size is given.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Source file used when none is given on the command line.
pub const DEFAULT_SOURCE_PATH: &str = "oasymbols.csv";

/// Database file used when none is given on the command line.
pub const DEFAULT_DATABASE_PATH: &str = "database/simplifyed.db";

/// How the import is split into transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitMode {
    /// Commit after the delete and after every batch. A failed run leaves the
    /// batches committed before the failure in place.
    #[default]
    PerBatch,
    /// One transaction spans delete, inserts, index rebuild and log entry.
    /// A failed run leaves the previous contents untouched.
    Atomic,
}

impl CommitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitMode::PerBatch => "per_batch",
            CommitMode::Atomic => "atomic",
        }
    }
}

impl std::fmt::Display for CommitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the import pipeline needs to know about one run.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// CSV file holding the instrument master.
    pub source_path: PathBuf,
    /// SQLite database holding `instruments`.
    pub database_path: PathBuf,
    /// Rows per committed batch.
    pub batch_size: usize,
    pub commit_mode: CommitMode,
    /// Create missing tables before importing.
    pub create_schema: bool,
}

impl ImportConfig {
    pub fn new(source_path: impl Into<PathBuf>, database_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            database_path: database_path.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            commit_mode: CommitMode::default(),
            create_schema: true,
        }
    }

    pub fn validate(&self) -> ImportResult<()> {
        if self.batch_size == 0 {
            return Err(ImportError::InvalidConfig(
                "batch size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_PATH, DEFAULT_DATABASE_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ImportConfig::default();
        assert_eq!(config.source_path, PathBuf::from("oasymbols.csv"));
        assert_eq!(config.database_path, PathBuf::from("database/simplifyed.db"));
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.commit_mode, CommitMode::PerBatch);
        assert!(config.create_schema);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = ImportConfig::default();
        config.batch_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ImportError::InvalidConfig(_))
        ));
    }
}
