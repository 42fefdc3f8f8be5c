pub mod aggregator;
pub mod event;
pub mod loop_fn;
pub mod report;
pub mod scan_config;

pub use aggregator::{progress_percent, BatchAggregator, RunningTable};
pub use event::{BatchPayload, ChartPayload, ChartSlot, ScanEvent};
pub use loop_fn::{process_image, run_scan};
pub use report::ScanReport;
pub use scan_config::{ScanConfig, TagSelection};
