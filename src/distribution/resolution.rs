use serde::Serialize;

use crate::distribution::aggregate_state::AggregateState;
use crate::distribution::chart::{percent_of, ChartDescriptor, ChartKind, DataPoint};
use crate::stats::round2;

/// Bucket collecting every resolution outside the top k.
pub const OTHER: &str = "other";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionBucket {
    pub label: String,
    pub images: u64,
    pub pct: f64,
}

/// Most frequent resolutions first; `"other"` last when present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionHistogram {
    pub total_images: u64,
    pub buckets: Vec<ResolutionBucket>,
}

impl ResolutionHistogram {
    /// Keeps the `top_k` most frequent resolutions by name. Equal counts
    /// keep first-seen order. The rest are summed into one `"other"`
    /// bucket, which is omitted when nothing was left out.
    pub fn from_state(state: &AggregateState, top_k: usize) -> Self {
        let total = state.images;
        let mut freq: Vec<(String, u64)> = state.resolutions().to_vec();
        // Stable: ties stay in first-seen order.
        freq.sort_by(|a, b| b.1.cmp(&a.1));

        let rest = if freq.len() > top_k { freq.split_off(top_k) } else { Vec::new() };
        let mut buckets: Vec<ResolutionBucket> = freq
            .into_iter()
            .map(|(label, images)| ResolutionBucket { label, images, pct: percent_of(images, total) })
            .collect();
        if !rest.is_empty() {
            let images = rest.iter().map(|(_, n)| n).sum();
            buckets.push(ResolutionBucket { label: OTHER.to_string(), images, pct: percent_of(images, total) });
        }

        ResolutionHistogram { total_images: total, buckets }
    }

    pub fn to_chart(&self) -> ChartDescriptor {
        let points = self
            .buckets
            .iter()
            .map(|b| DataPoint::new(&b.label, round2(b.pct), format!("{} ({:.2}%)", b.images, b.pct)))
            .collect();
        ChartDescriptor::new("Image resolutions", ChartKind::Pie).with_series("images %", points)
    }
}
