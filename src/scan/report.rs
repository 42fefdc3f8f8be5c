use serde::Serialize;

use crate::catalog::ProjectInfo;
use crate::distribution::Distributions;
use crate::record::{format_row, FormattedRow, TableColumns};
use crate::scan::aggregator::RunningTable;

/// Result of a finished or stopped scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub project: ProjectInfo,
    pub total_images: u64,
    pub columns: TableColumns,
    pub table: RunningTable,
    pub distributions: Distributions,
    pub warnings: Vec<String>,
    /// True when a stop request ended the scan early. The table and the
    /// distributions then only cover the images processed before it.
    pub was_stopped: bool,
    pub elapsed_ms: u64,
}

impl ScanReport {
    pub fn formatted_rows(&self) -> Vec<FormattedRow> {
        self.table.records().iter().map(|r| format_row(r, &self.columns)).collect()
    }

    /// Serializes the report to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> crate::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
