//! Read-only access to the annotated image collection.
//!
//! The scan only ever talks to a [`Catalog`]; where the data comes from
//! (a remote service, a JSON dump, a generator) is up to the implementation.

pub mod memory;
pub mod retry;
pub mod synthetic;

use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationPayload;
use crate::error::Result;
use crate::schema::MetaPayload;

pub use memory::{DatasetDump, ImageDump, MemoryCatalog, ProjectDump};
pub use retry::RetryingCatalog;
pub use synthetic::{generate_project, SyntheticOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Images,
    Videos,
    Volumes,
    PointClouds,
}

impl ProjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Images => "images",
            ProjectKind::Videos => "videos",
            ProjectKind::Volumes => "volumes",
            ProjectKind::PointClouds => "point_clouds",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: u64,
    pub name: String,
    pub kind: ProjectKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: u64,
    pub name: String,
    /// Color channels of the stored image.
    #[serde(default = "default_channels")]
    pub channels: u32,
}

fn default_channels() -> u32 {
    3
}

/// Source of project metadata and annotations.
///
/// Listings are ordered; the scan preserves that order in its output.
pub trait Catalog: Send + Sync {
    /// Returns `None` when no project has this id.
    fn project(&self, project_id: u64) -> Result<Option<ProjectInfo>>;

    fn project_meta(&self, project_id: u64) -> Result<MetaPayload>;

    fn datasets(&self, project_id: u64) -> Result<Vec<DatasetInfo>>;

    fn images(&self, dataset_id: u64) -> Result<Vec<ImageInfo>>;

    /// One payload per id, in the order of `image_ids`.
    fn download_annotations(&self, dataset_id: u64, image_ids: &[u64]) -> Result<Vec<AnnotationPayload>>;

    fn images_count(&self, project_id: u64) -> Result<u64>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn project(&self, project_id: u64) -> Result<Option<ProjectInfo>> {
        (**self).project(project_id)
    }

    fn project_meta(&self, project_id: u64) -> Result<MetaPayload> {
        (**self).project_meta(project_id)
    }

    fn datasets(&self, project_id: u64) -> Result<Vec<DatasetInfo>> {
        (**self).datasets(project_id)
    }

    fn images(&self, dataset_id: u64) -> Result<Vec<ImageInfo>> {
        (**self).images(dataset_id)
    }

    fn download_annotations(&self, dataset_id: u64, image_ids: &[u64]) -> Result<Vec<AnnotationPayload>> {
        (**self).download_annotations(dataset_id, image_ids)
    }

    fn images_count(&self, project_id: u64) -> Result<u64> {
        (**self).images_count(project_id)
    }
}

impl<C: Catalog + ?Sized> Catalog for Box<C> {
    fn project(&self, project_id: u64) -> Result<Option<ProjectInfo>> {
        (**self).project(project_id)
    }

    fn project_meta(&self, project_id: u64) -> Result<MetaPayload> {
        (**self).project_meta(project_id)
    }

    fn datasets(&self, project_id: u64) -> Result<Vec<DatasetInfo>> {
        (**self).datasets(project_id)
    }

    fn images(&self, dataset_id: u64) -> Result<Vec<ImageInfo>> {
        (**self).images(dataset_id)
    }

    fn download_annotations(&self, dataset_id: u64, image_ids: &[u64]) -> Result<Vec<AnnotationPayload>> {
        (**self).download_annotations(dataset_id, image_ids)
    }

    fn images_count(&self, project_id: u64) -> Result<u64> {
        (**self).images_count(project_id)
    }
}
