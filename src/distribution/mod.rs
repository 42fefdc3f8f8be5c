//! Reduction of the finished running table into chart-ready distributions.

pub mod aggregate_state;
pub mod chart;
pub mod class_dist;
pub mod resolution;
pub mod tag_dist;

use serde::Serialize;

use crate::record::{PerImageRecord, TableColumns};
use crate::schema::ProjectMeta;

pub use aggregate_state::{AggregateState, ColumnAccumulator};
pub use chart::{ChartDescriptor, ChartKind, DataPoint, Series};
pub use class_dist::{ClassDistribution, ClassDistributionRow};
pub use resolution::{ResolutionBucket, ResolutionHistogram, OTHER};
pub use tag_dist::{PresenceRow, TagDistribution, ANY_TAG};

/// The three final distributions of a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distributions {
    pub classes: ClassDistribution,
    /// `None` when the run requested no tags.
    pub tags: Option<TagDistribution>,
    pub resolutions: ResolutionHistogram,
}

impl Distributions {
    pub fn from_state(state: &AggregateState, meta: &ProjectMeta, columns: &TableColumns, top_k: usize) -> Self {
        Distributions {
            classes: ClassDistribution::from_state(state, meta),
            tags: TagDistribution::from_state(state, columns.tag_names()),
            resolutions: ResolutionHistogram::from_state(state, top_k),
        }
    }

    /// Class, tag and resolution charts, in that order. The tag chart has no
    /// series when no tags were requested.
    pub fn charts(&self) -> [ChartDescriptor; 3] {
        let tags = match &self.tags {
            Some(t) => t.to_chart(),
            None => TagDistribution::empty_chart(),
        };
        [self.classes.to_chart(), tags, self.resolutions.to_chart()]
    }
}

/// Reduces a complete table in one pass.
pub fn compute_distributions(
    records: &[PerImageRecord],
    meta: &ProjectMeta,
    columns: &TableColumns,
    top_k: usize,
) -> Distributions {
    let state = AggregateState::from_records(records, meta.class_count(), columns.tag_names().len());
    Distributions::from_state(&state, meta, columns, top_k)
}
