use serde::Serialize;

use crate::record::{format_row, PerImageRecord, TableColumns};
use crate::scan::event::BatchPayload;

/// All records of the current scan, in scan order.
///
/// Only grows; `BatchAggregator` is its single writer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RunningTable {
    records: Vec<PerImageRecord>,
}

impl RunningTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PerImageRecord] {
        &self.records
    }
}

/// Images processed as an integer percentage of `total`, rounded down and
/// clamped to 0..=100. An empty project is complete from the start.
pub fn progress_percent(done: usize, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (done as u128 * 100) / total as u128;
    pct.min(100) as u8
}

/// Appends finished batches to the running table and reports progress.
///
/// While the aggregator exists the scan is in progress; [`finish`] ends it
/// and hands out the frozen table.
///
/// [`finish`]: BatchAggregator::finish
pub struct BatchAggregator {
    table: RunningTable,
    columns: TableColumns,
    total_images: u64,
    batches: usize,
}

impl BatchAggregator {
    pub fn new(columns: TableColumns, total_images: u64) -> Self {
        BatchAggregator { table: RunningTable::default(), columns, total_images, batches: 0 }
    }

    /// Appends one batch, in the order given, and returns the payload to
    /// emit for it.
    pub fn push_batch(&mut self, records: Vec<PerImageRecord>) -> BatchPayload {
        let rows = records.iter().map(|r| format_row(r, &self.columns)).collect();
        self.table.records.extend(records);
        self.batches += 1;
        BatchPayload { progress: self.progress(), rows }
    }

    pub fn progress(&self) -> u8 {
        progress_percent(self.table.len(), self.total_images)
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn table(&self) -> &RunningTable {
        &self.table
    }

    pub fn columns(&self) -> &TableColumns {
        &self.columns
    }

    pub fn finish(self) -> RunningTable {
        self.table
    }
}
