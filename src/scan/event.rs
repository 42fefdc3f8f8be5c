use serde::Serialize;

use crate::distribution::ChartDescriptor;
use crate::record::FormattedRow;

/// Rows of one finished batch. Consumers append, never replace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchPayload {
    /// Images processed so far as an integer percentage, 0..=100.
    pub progress: u8,
    #[serde(rename = "tablePerImageStats")]
    pub rows: Vec<FormattedRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartSlot {
    Classes,
    Tags,
    Resolutions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub slot: ChartSlot,
    pub chart: ChartDescriptor,
    pub loading: bool,
}

/// Everything a scan reports while it runs, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ScanEvent {
    /// A schema inconsistency that does not stop the scan.
    Warning(String),
    /// Progress without rows; only sent when the project has no images.
    Progress(u8),
    Batch(BatchPayload),
    Chart(ChartPayload),
    Finished { images: usize, was_stopped: bool },
}

impl ScanEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            ScanEvent::Warning(_) => "warning",
            ScanEvent::Progress(_) => "progress",
            ScanEvent::Batch(_) => "batch",
            ScanEvent::Chart(_) => "chart",
            ScanEvent::Finished { .. } => "finished",
        }
    }
}
