use serde::Serialize;

use crate::distribution::aggregate_state::AggregateState;
use crate::distribution::chart::{percent_of, ChartDescriptor, ChartKind};
use crate::distribution::class_dist::presence_point;

/// Pseudo-tag set on images carrying at least one requested tag.
pub const ANY_TAG: &str = "any tag";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresenceRow {
    pub name: String,
    pub images_with: u64,
    pub images_without: u64,
    pub with_pct: f64,
    pub without_pct: f64,
}

impl PresenceRow {
    fn new(name: &str, with: u64, total: u64) -> Self {
        let without = total.saturating_sub(with);
        PresenceRow {
            name: name.to_string(),
            images_with: with,
            images_without: without,
            with_pct: percent_of(with, total),
            without_pct: percent_of(without, total),
        }
    }
}

/// "any tag" row first, then requested tags in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagDistribution {
    pub total_images: u64,
    pub rows: Vec<PresenceRow>,
}

impl TagDistribution {
    /// `None` when no tags were requested.
    pub fn from_state(state: &AggregateState, tag_names: &[String]) -> Option<Self> {
        if tag_names.is_empty() {
            return None;
        }
        let total = state.images;
        let mut rows = vec![PresenceRow::new(ANY_TAG, state.any_tag_with, total)];
        rows.extend(
            tag_names
                .iter()
                .zip(&state.tag_with)
                .map(|(name, &with)| PresenceRow::new(name, with, total)),
        );
        Some(TagDistribution { total_images: total, rows })
    }

    pub fn row(&self, name: &str) -> Option<&PresenceRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn to_chart(&self) -> ChartDescriptor {
        let with = self
            .rows
            .iter()
            .map(|r| presence_point(&r.name, Some(r.images_with), Some(r.with_pct)))
            .collect();
        let without = self
            .rows
            .iter()
            .map(|r| presence_point(&r.name, Some(r.images_without), Some(r.without_pct)))
            .collect();
        TagDistribution::empty_chart()
            .with_series("images with", with)
            .with_series("images without", without)
    }

    pub fn empty_chart() -> ChartDescriptor {
        ChartDescriptor::new("Tags: images with / without", ChartKind::StackedBar)
    }
}
