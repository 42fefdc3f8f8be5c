use serde::{Deserialize, Serialize};

use crate::annotation::ImageSize;
use crate::catalog::ImageInfo;
use crate::stats::ImageStats;

/// Statistics of one scanned image plus where it came from.
///
/// Built once, appended to the running table once, never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerImageRecord {
    pub id: u64,
    pub name: String,
    pub dataset: String,
    pub height: usize,
    pub width: usize,
    pub channels: u32,
    pub stats: ImageStats,
}

impl PerImageRecord {
    /// `"<height> x <width> x <channels>"`.
    pub fn resolution_label(&self) -> String {
        format!("{} x {} x {}", self.height, self.width, self.channels)
    }
}

/// Attaches identity fields to extracted statistics. Dimensions are those
/// of the rendered raster, i.e. the annotation's declared size.
pub fn build_record(info: &ImageInfo, dataset_name: &str, size: ImageSize, stats: ImageStats) -> PerImageRecord {
    PerImageRecord {
        id: info.id,
        name: info.name.clone(),
        dataset: dataset_name.to_string(),
        height: size.height,
        width: size.width,
        channels: info.channels,
        stats,
    }
}
