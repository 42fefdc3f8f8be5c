use std::collections::HashMap;

use serde::Serialize;

use crate::record::PerImageRecord;

/// Running sum of the nonzero values of one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnAccumulator {
    pub sum: f64,
    pub nonzero: u64,
}

impl ColumnAccumulator {
    pub fn observe(&mut self, value: f64) {
        if value > 0.0 {
            self.sum += value;
            self.nonzero += 1;
        }
    }

    /// Mean over nonzero samples only; 0 when there are none.
    pub fn mean_nonzero(&self) -> f64 {
        if self.nonzero == 0 {
            0.0
        } else {
            self.sum / self.nonzero as f64
        }
    }
}

/// Per-column sums, presence counts and resolution frequencies.
///
/// Can be fed record by record while scanning; only the state after the
/// last record describes the full table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateState {
    pub images: u64,
    pub unlabeled_area: ColumnAccumulator,
    pub class_area: Vec<ColumnAccumulator>,
    pub class_count: Vec<ColumnAccumulator>,
    /// Images carrying each requested tag.
    pub tag_with: Vec<u64>,
    /// Images carrying at least one requested tag.
    pub any_tag_with: u64,
    /// Resolution label and frequency, in first-seen order.
    resolutions: Vec<(String, u64)>,
    #[serde(skip)]
    resolution_index: HashMap<String, usize>,
}

impl AggregateState {
    pub fn new(n_classes: usize, n_tags: usize) -> Self {
        AggregateState {
            images: 0,
            unlabeled_area: ColumnAccumulator::default(),
            class_area: vec![ColumnAccumulator::default(); n_classes],
            class_count: vec![ColumnAccumulator::default(); n_classes],
            tag_with: vec![0; n_tags],
            any_tag_with: 0,
            resolutions: Vec::new(),
            resolution_index: HashMap::new(),
        }
    }

    pub fn from_records(records: &[PerImageRecord], n_classes: usize, n_tags: usize) -> Self {
        let mut state = AggregateState::new(n_classes, n_tags);
        for record in records {
            state.observe(record);
        }
        state
    }

    pub fn observe(&mut self, record: &PerImageRecord) {
        let stats = &record.stats;
        self.images += 1;
        self.unlabeled_area.observe(stats.unlabeled_area_pct);
        for (acc, &v) in self.class_area.iter_mut().zip(&stats.class_area_pct) {
            acc.observe(v);
        }
        for (acc, &v) in self.class_count.iter_mut().zip(&stats.class_count) {
            acc.observe(v as f64);
        }
        if let Some(tags) = &stats.tag_presence {
            for (with, &present) in self.tag_with.iter_mut().zip(tags) {
                if present > 0 {
                    *with += 1;
                }
            }
            if tags.iter().any(|&p| p > 0) {
                self.any_tag_with += 1;
            }
        }

        let label = record.resolution_label();
        match self.resolution_index.get(&label) {
            Some(&i) => self.resolutions[i].1 += 1,
            None => {
                self.resolution_index.insert(label.clone(), self.resolutions.len());
                self.resolutions.push((label, 1));
            }
        }
    }

    pub fn resolutions(&self) -> &[(String, u64)] {
        &self.resolutions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ImageStats;

    fn record(h: usize, area: Vec<f64>, count: Vec<u32>, tags: Option<Vec<u32>>) -> PerImageRecord {
        let unlabeled = 100.0 - area.iter().sum::<f64>();
        PerImageRecord {
            id: 0,
            name: String::new(),
            dataset: String::new(),
            height: h,
            width: 10,
            channels: 3,
            stats: ImageStats { unlabeled_area_pct: unlabeled, class_area_pct: area, class_count: count, tag_presence: tags },
        }
    }

    #[test]
    fn test_zero_values_are_left_out_of_means() {
        let records = vec![
            record(1, vec![40.0, 0.0], vec![2, 0], None),
            record(1, vec![20.0, 0.0], vec![0, 0], None),
            record(2, vec![0.0, 0.0], vec![1, 0], None),
        ];
        let state = AggregateState::from_records(&records, 2, 0);
        assert_eq!(state.class_area[0].mean_nonzero(), 30.0);
        assert_eq!(state.class_area[1].mean_nonzero(), 0.0);
        assert_eq!(state.class_count[0].mean_nonzero(), 1.5);
        assert_eq!(state.class_count[0].nonzero, 2);
        assert_eq!(state.unlabeled_area.mean_nonzero(), (60.0 + 80.0 + 100.0) / 3.0);
    }

    #[test]
    fn test_tag_and_resolution_counts() {
        let records = vec![
            record(5, vec![], vec![], Some(vec![1, 0])),
            record(7, vec![], vec![], Some(vec![1, 1])),
            record(5, vec![], vec![], Some(vec![0, 0])),
        ];
        let state = AggregateState::from_records(&records, 0, 2);
        assert_eq!(state.tag_with, vec![2, 1]);
        assert_eq!(state.any_tag_with, 2);
        assert_eq!(
            state.resolutions(),
            &[("5 x 10 x 3".to_string(), 2), ("7 x 10 x 3".to_string(), 1)]
        );
    }
}
