use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationPayload;
use crate::catalog::{Catalog, DatasetInfo, ImageInfo, ProjectInfo};
use crate::error::{Error, Result};
use crate::schema::MetaPayload;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDump {
    pub info: ImageInfo,
    pub annotation: AnnotationPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDump {
    pub info: DatasetInfo,
    pub images: Vec<ImageDump>,
}

/// A whole project in one serializable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDump {
    pub project: ProjectInfo,
    pub meta: MetaPayload,
    pub datasets: Vec<DatasetDump>,
}

impl ProjectDump {
    pub fn image_count(&self) -> usize {
        self.datasets.iter().map(|d| d.images.len()).sum()
    }

    /// Serializes the dump to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `ProjectDump` from a JSON file.
    pub fn load_json(path: &str) -> Result<ProjectDump> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Catalog serving projects held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    projects: Vec<ProjectDump>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        MemoryCatalog { projects: Vec::new() }
    }

    pub fn from_dump(dump: ProjectDump) -> Self {
        MemoryCatalog { projects: vec![dump] }
    }

    pub fn load_json(path: &str) -> Result<Self> {
        Ok(MemoryCatalog::from_dump(ProjectDump::load_json(path)?))
    }

    pub fn add_project(&mut self, dump: ProjectDump) {
        self.projects.push(dump);
    }

    fn find_project(&self, project_id: u64) -> Result<&ProjectDump> {
        self.projects
            .iter()
            .find(|p| p.project.id == project_id)
            .ok_or_else(|| Error::Fetch(format!("project {} is not in the catalog", project_id)))
    }

    fn find_dataset(&self, dataset_id: u64) -> Result<&DatasetDump> {
        self.projects
            .iter()
            .flat_map(|p| p.datasets.iter())
            .find(|d| d.info.id == dataset_id)
            .ok_or_else(|| Error::Fetch(format!("dataset {} is not in the catalog", dataset_id)))
    }
}

impl Catalog for MemoryCatalog {
    fn project(&self, project_id: u64) -> Result<Option<ProjectInfo>> {
        Ok(self
            .projects
            .iter()
            .find(|p| p.project.id == project_id)
            .map(|p| p.project.clone()))
    }

    fn project_meta(&self, project_id: u64) -> Result<MetaPayload> {
        Ok(self.find_project(project_id)?.meta.clone())
    }

    fn datasets(&self, project_id: u64) -> Result<Vec<DatasetInfo>> {
        Ok(self
            .find_project(project_id)?
            .datasets
            .iter()
            .map(|d| d.info.clone())
            .collect())
    }

    fn images(&self, dataset_id: u64) -> Result<Vec<ImageInfo>> {
        Ok(self
            .find_dataset(dataset_id)?
            .images
            .iter()
            .map(|i| i.info.clone())
            .collect())
    }

    fn download_annotations(&self, dataset_id: u64, image_ids: &[u64]) -> Result<Vec<AnnotationPayload>> {
        let dataset = self.find_dataset(dataset_id)?;
        image_ids
            .iter()
            .map(|id| {
                dataset
                    .images
                    .iter()
                    .find(|img| img.info.id == *id)
                    .map(|img| img.annotation.clone())
                    .ok_or_else(|| {
                        Error::Fetch(format!("image {} is not in dataset {}", id, dataset_id))
                    })
            })
            .collect()
    }

    fn images_count(&self, project_id: u64) -> Result<u64> {
        Ok(self.find_project(project_id)?.image_count() as u64)
    }
}
