use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::annotation::geometry::Geometry;
use crate::error::{Error, Result};
use crate::schema::ProjectMeta;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub height: usize,
    pub width: usize,
}

impl ImageSize {
    pub fn area(&self) -> usize {
        self.height * self.width
    }
}

/// One labeled object in an annotation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPayload {
    pub class_title: String,
    #[serde(flatten)]
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRef {
    pub name: String,
}

/// Annotation of one image exactly as the catalog delivers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationPayload {
    pub size: ImageSize,
    #[serde(default)]
    pub objects: Vec<ObjectPayload>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

/// A shape resolved against the run schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub class_name: String,
    pub class_index: u32,
    pub geometry: Geometry,
}

/// Annotation of one image, with every shape bound to a class index.
///
/// Shape order is drawing order: later shapes cover earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub img_size: ImageSize,
    pub shapes: Vec<Shape>,
    pub tags: HashSet<String>,
}

impl Annotation {
    /// Resolves class titles to indices. `image_id` is only used for errors.
    pub fn from_payload(payload: &AnnotationPayload, meta: &ProjectMeta, image_id: u64) -> Result<Annotation> {
        let shapes = payload
            .objects
            .iter()
            .map(|obj| {
                let class_index = meta.index_of(&obj.class_title).ok_or_else(|| Error::UnknownClass {
                    class: obj.class_title.clone(),
                    image: image_id,
                })?;
                Ok(Shape {
                    class_name: obj.class_title.clone(),
                    class_index,
                    geometry: obj.geometry.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let tags = payload.tags.iter().map(|t| t.name.clone()).collect();

        Ok(Annotation { img_size: payload.size, shapes, tags })
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }
}
