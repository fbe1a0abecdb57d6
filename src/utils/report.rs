use std::io::Write;
use std::path::Path;

use crate::errors::{ImportError, ImportResult};
use crate::models::instrument::InstrumentSummary;

const RULE_WIDTH: usize = 70;

/// Console report of an import run, written to any `Write` sink.
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) -> ImportResult<()> {
        writeln!(self.out, "{}", text).map_err(|e| ImportError::Report(e.to_string()))
    }

    fn blank(&mut self) -> ImportResult<()> {
        self.line("")
    }

    // ── Run phases ──

    pub fn banner(&mut self) -> ImportResult<()> {
        self.line(&"=".repeat(RULE_WIDTH))?;
        self.line("Starting instruments import from CSV...")?;
        self.line(&"=".repeat(RULE_WIDTH))?;
        self.blank()
    }

    pub fn clearing(&mut self) -> ImportResult<()> {
        self.line("Clearing existing instruments...")
    }

    pub fn cleared(&mut self, removed: usize) -> ImportResult<()> {
        self.line(&format!(
            "✓ Existing instruments cleared ({} rows)",
            fmt_count(removed as i64)
        ))?;
        self.blank()
    }

    pub fn reading(&mut self, source: &Path, total: usize) -> ImportResult<()> {
        self.line(&format!("Reading CSV file: {}", source.display()))?;
        self.line(&format!("Total records to import: {}", fmt_count(total as i64)))?;
        self.blank()
    }

    pub fn batch_committed(&mut self, processed: usize, total: usize) -> ImportResult<()> {
        self.line(&format!(
            "✓ Committed batch: {}/{} ({:.1}%)",
            fmt_count(processed as i64),
            fmt_count(total as i64),
            percent(processed, total)
        ))
    }

    pub fn import_finished(&mut self, inserted: usize) -> ImportResult<()> {
        self.line(&format!(
            "✓ Committed final batch: {} records",
            fmt_count(inserted as i64)
        ))?;
        self.blank()
    }

    pub fn instrument_total(&mut self, count: i64) -> ImportResult<()> {
        self.line(&format!("✓ Total instruments in database: {}", fmt_count(count)))?;
        self.blank()
    }

    pub fn rebuilding_search_index(&mut self) -> ImportResult<()> {
        self.line("Rebuilding FTS table...")
    }

    pub fn search_index_rebuilt(&mut self, fts_count: i64) -> ImportResult<()> {
        self.line(&format!("✓ FTS table records: {}", fmt_count(fts_count)))?;
        self.blank()
    }

    pub fn refresh_logged(&mut self) -> ImportResult<()> {
        self.line("✓ Refresh log updated")?;
        self.blank()
    }

    // ── Summary tables ──

    pub fn sample(&mut self, rows: &[InstrumentSummary]) -> ImportResult<()> {
        self.section("Sample instruments:")?;
        for row in rows {
            self.line(&format!(
                "  {:<20} {:<40} {:<10} {}",
                display(&row.symbol),
                display(&row.name),
                display(&row.exchange),
                display(&row.instrumenttype)
            ))?;
        }
        self.blank()
    }

    pub fn breakdown(&mut self, title: &str, rows: &[(Option<String>, i64)]) -> ImportResult<()> {
        self.section(title)?;
        for (key, count) in rows {
            self.line(&format!("  {:<20} {:>10}", display(key), fmt_count(*count)))?;
        }
        self.blank()
    }

    pub fn completed(&mut self, count: i64, fts_count: i64) -> ImportResult<()> {
        self.line(&"=".repeat(RULE_WIDTH))?;
        self.line("✅ INSTRUMENTS IMPORT COMPLETED SUCCESSFULLY!")?;
        self.line(&"=".repeat(RULE_WIDTH))?;
        self.blank()?;
        self.line(&format!("Total instruments: {}", fmt_count(count)))?;
        self.line(&format!("FTS records: {}", fmt_count(fts_count)))?;
        self.blank()?;
        self.line("Instruments cache is now populated. Fast symbol search is available.")?;
        self.out.flush().map_err(|e| ImportError::Report(e.to_string()))
    }

    fn section(&mut self, title: &str) -> ImportResult<()> {
        self.line(title)?;
        self.line(&"-".repeat(RULE_WIDTH))
    }
}

fn display(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

/// Share of `total` already processed, in percent. An empty total counts as done.
pub fn percent(processed: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        processed as f64 / total as f64 * 100.0
    }
}

/// Format a count with comma thousands separators: `1234567` -> `1,234,567`.
pub fn fmt_count(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
