use serde::Serialize;

use crate::distribution::aggregate_state::AggregateState;
use crate::distribution::chart::{percent_of, ChartDescriptor, ChartKind, DataPoint};
use crate::record::UNLABELED;
use crate::schema::{ProjectMeta, Rgb};
use crate::stats::round2;

/// Distribution row of the unlabeled area or of one class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDistributionRow {
    pub name: String,
    pub color: Option<Rgb>,
    /// Mean area over images where the area is nonzero.
    pub mean_area_pct: f64,
    /// Mean shape count over images with at least one shape. `None` for
    /// the unlabeled row, which has no shapes.
    pub mean_count: Option<f64>,
    pub images_with: Option<u64>,
    pub images_without: Option<u64>,
    pub with_pct: Option<f64>,
    pub without_pct: Option<f64>,
}

/// Unlabeled row first, then classes in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDistribution {
    pub total_images: u64,
    pub rows: Vec<ClassDistributionRow>,
}

impl ClassDistribution {
    pub fn from_state(state: &AggregateState, meta: &ProjectMeta) -> Self {
        let total = state.images;
        let mut rows = Vec::with_capacity(meta.class_count() + 1);
        rows.push(ClassDistributionRow {
            name: UNLABELED.to_string(),
            color: None,
            mean_area_pct: state.unlabeled_area.mean_nonzero(),
            mean_count: None,
            images_with: None,
            images_without: None,
            with_pct: None,
            without_pct: None,
        });

        for ((class, area), count) in meta.classes().iter().zip(&state.class_area).zip(&state.class_count) {
            let with = count.nonzero;
            let without = total.saturating_sub(with);
            rows.push(ClassDistributionRow {
                name: class.name.clone(),
                color: Some(class.color),
                mean_area_pct: area.mean_nonzero(),
                mean_count: Some(count.mean_nonzero()),
                images_with: Some(with),
                images_without: Some(without),
                with_pct: Some(percent_of(with, total)),
                without_pct: Some(percent_of(without, total)),
            });
        }

        ClassDistribution { total_images: total, rows }
    }

    pub fn row(&self, name: &str) -> Option<&ClassDistributionRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Series: mean area, mean count, images with, images without.
    pub fn to_chart(&self) -> ChartDescriptor {
        let area = self
            .rows
            .iter()
            .map(|r| DataPoint::new(&r.name, round2(r.mean_area_pct), format!("{:.2}%", r.mean_area_pct)))
            .collect();
        let classes = || self.rows.iter().filter(|r| r.mean_count.is_some());
        let count = classes()
            .map(|r| {
                let mean = r.mean_count.unwrap_or(0.0);
                DataPoint::new(&r.name, round2(mean), format!("{:.2}", mean))
            })
            .collect();
        let with = classes()
            .map(|r| presence_point(&r.name, r.images_with, r.with_pct))
            .collect();
        let without = classes()
            .map(|r| presence_point(&r.name, r.images_without, r.without_pct))
            .collect();

        ChartDescriptor::new("Classes: area and count", ChartKind::Bar)
            .with_series("mean area %", area)
            .with_series("mean count", count)
            .with_series("images with", with)
            .with_series("images without", without)
    }
}

pub(crate) fn presence_point(label: &str, images: Option<u64>, pct: Option<f64>) -> DataPoint {
    let images = images.unwrap_or(0);
    let pct = pct.unwrap_or(0.0);
    DataPoint::new(label, images as f64, format!("{} ({:.2}%)", images, pct))
}
