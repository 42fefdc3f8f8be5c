use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    StackedBar,
    Pie,
}

/// One labeled value with its display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<DataPoint>,
}

/// Plotting-library-neutral chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDescriptor {
    pub title: String,
    pub kind: ChartKind,
    pub series: Vec<Series>,
}

impl ChartDescriptor {
    pub fn new(title: &str, kind: ChartKind) -> Self {
        ChartDescriptor { title: title.to_string(), kind, series: Vec::new() }
    }

    pub fn with_series(mut self, name: &str, points: Vec<DataPoint>) -> Self {
        self.series.push(Series { name: name.to_string(), points });
        self
    }

    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }
}

impl DataPoint {
    pub fn new(label: &str, value: f64, text: String) -> Self {
        DataPoint { label: label.to_string(), value, text }
    }
}

/// `part` as a percentage of `whole`; 0 when `whole` is 0.
pub(crate) fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
