use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::color::Rgb;

/// Class declaration as delivered by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassPayload {
    pub title: String,
    pub color: Rgb,
}

/// Tag declaration as delivered by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagPayload {
    pub name: String,
    pub color: Rgb,
}

/// Project schema payload: ordered classes and tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaPayload {
    #[serde(default)]
    pub classes: Vec<ClassPayload>,
    #[serde(default)]
    pub tags: Vec<TagPayload>,
}

/// A named, colored category. `index` is 1-based; 0 means unlabeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectClass {
    pub name: String,
    pub color: Rgb,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagMeta {
    pub name: String,
    pub color: Rgb,
}

/// Non-fatal schema inconsistency found while building a [`ProjectMeta`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchemaWarning {
    /// Several classes share one color. Statistics stay keyed by name.
    DuplicateColor { color: Rgb, classes: Vec<String> },
}

impl std::fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaWarning::DuplicateColor { color, classes } => write!(
                f,
                "classes {} share color {}",
                classes.join(", "),
                color.to_hex()
            ),
        }
    }
}

/// Class and tag schema for one run.
///
/// Class indices are assigned once, in declaration order, and never change
/// for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct ProjectMeta {
    classes: Vec<ObjectClass>,
    tags: Vec<TagMeta>,
    name_to_index: HashMap<String, u32>,
    warnings: Vec<SchemaWarning>,
}

impl ProjectMeta {
    /// Builds the run schema. Duplicate class or tag names are rejected;
    /// duplicate class colors only produce a warning.
    pub fn from_payload(payload: &MetaPayload) -> Result<ProjectMeta> {
        let mut name_to_index = HashMap::with_capacity(payload.classes.len());
        let mut classes = Vec::with_capacity(payload.classes.len());

        for (idx, class) in payload.classes.iter().enumerate() {
            let index = idx as u32 + 1;
            if name_to_index.insert(class.title.clone(), index).is_some() {
                return Err(Error::Config(format!(
                    "object class {:?} is declared twice",
                    class.title
                )));
            }
            classes.push(ObjectClass {
                name: class.title.clone(),
                color: class.color,
                index,
            });
        }

        let mut tags: Vec<TagMeta> = Vec::with_capacity(payload.tags.len());
        for tag in &payload.tags {
            if tags.iter().any(|t| t.name == tag.name) {
                return Err(Error::Config(format!("tag {:?} is declared twice", tag.name)));
            }
            tags.push(TagMeta { name: tag.name.clone(), color: tag.color });
        }

        let warnings = duplicate_colors(&classes);

        Ok(ProjectMeta { classes, tags, name_to_index, warnings })
    }

    pub fn classes(&self) -> &[ObjectClass] {
        &self.classes
    }

    pub fn tags(&self) -> &[TagMeta] {
        &self.tags
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn index_of(&self, class_name: &str) -> Option<u32> {
        self.name_to_index.get(class_name).copied()
    }

    pub fn tag(&self, name: &str) -> Option<&TagMeta> {
        self.tags.iter().find(|t| t.name == name)
    }

    pub fn warnings(&self) -> &[SchemaWarning] {
        &self.warnings
    }
}

fn duplicate_colors(classes: &[ObjectClass]) -> Vec<SchemaWarning> {
    // Keyed by first occurrence so warnings follow declaration order.
    let mut groups: Vec<(Rgb, Vec<String>)> = Vec::new();
    for class in classes {
        match groups.iter_mut().find(|(color, _)| *color == class.color) {
            Some((_, names)) => names.push(class.name.clone()),
            None => groups.push((class.color, vec![class.name.clone()])),
        }
    }
    groups
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(color, classes)| SchemaWarning::DuplicateColor { color, classes })
        .collect()
}
