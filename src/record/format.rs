use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::record::columns::TableColumns;
use crate::record::record::PerImageRecord;
use crate::stats::round1;

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int(u64),
    Float(f64),
    Text(String),
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Int(v) => serializer.serialize_u64(*v),
            CellValue::Float(v) => serializer.serialize_f64(*v),
            CellValue::Text(v) => serializer.serialize_str(v),
        }
    }
}

/// A record laid out as table cells, in column order.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedRow {
    pub cells: Vec<(String, CellValue)>,
}

impl FormattedRow {
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for FormattedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (key, value) in &self.cells {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Lays a record out along `columns`, rounding every float to one decimal.
///
/// Tag cells are only present when the run requested tags.
pub fn format_row(record: &PerImageRecord, columns: &TableColumns) -> FormattedRow {
    let stats = &record.stats;
    let mut values: Vec<CellValue> = vec![
        CellValue::Int(record.id),
        CellValue::Text(record.name.clone()),
        CellValue::Text(record.dataset.clone()),
        CellValue::Int(record.height as u64),
        CellValue::Int(record.width as u64),
        CellValue::Int(record.channels as u64),
        CellValue::Float(round1(stats.unlabeled_area_pct)),
    ];
    values.extend(stats.class_area_pct.iter().map(|&v| CellValue::Float(round1(v))));
    values.extend(stats.class_count.iter().map(|&v| CellValue::Int(v as u64)));
    if let Some(tags) = &stats.tag_presence {
        values.extend(tags.iter().map(|&v| CellValue::Int(v as u64)));
    }

    let cells = columns
        .keys()
        .zip(values)
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    FormattedRow { cells }
}
