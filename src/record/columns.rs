use serde::{Deserialize, Serialize};

use crate::schema::{ProjectMeta, Rgb};

/// Name used for pixels no shape covers.
pub const UNLABELED: &str = "unlabeled";

pub fn area_key(name: &str) -> String {
    format!("{} [area %]", name)
}

pub fn count_key(name: &str) -> String {
    format!("{} [count]", name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnGroup {
    Identity,
    Area,
    Count,
    Tag,
}

/// One table column. `color` lets a UI draw the class/tag swatch next to
/// the title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub group: ColumnGroup,
    pub color: Option<Rgb>,
}

/// Ordered table layout for one run: identity, area, count, then tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumns {
    columns: Vec<Column>,
    class_names: Vec<String>,
    tag_names: Vec<String>,
}

impl TableColumns {
    /// `tag_names` are the requested tags, in declaration order. Tags the
    /// schema does not declare get no color.
    pub fn new(meta: &ProjectMeta, tag_names: &[String]) -> TableColumns {
        let identity = ["id", "name", "dataset", "height", "width", "channels"];
        let mut columns: Vec<Column> = identity
            .iter()
            .map(|key| Column { key: key.to_string(), group: ColumnGroup::Identity, color: None })
            .collect();

        columns.push(Column { key: area_key(UNLABELED), group: ColumnGroup::Area, color: None });
        for class in meta.classes() {
            columns.push(Column { key: area_key(&class.name), group: ColumnGroup::Area, color: Some(class.color) });
        }
        for class in meta.classes() {
            columns.push(Column { key: count_key(&class.name), group: ColumnGroup::Count, color: Some(class.color) });
        }
        for name in tag_names {
            columns.push(Column {
                key: name.clone(),
                group: ColumnGroup::Tag,
                color: meta.tag(name).map(|t| t.color),
            });
        }

        TableColumns {
            columns,
            class_names: meta.classes().iter().map(|c| c.name.clone()).collect(),
            tag_names: tag_names.to_vec(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn tag_names(&self) -> &[String] {
        &self.tag_names
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }
}
