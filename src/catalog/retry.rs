use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::annotation::AnnotationPayload;
use crate::catalog::{Catalog, DatasetInfo, ImageInfo, ProjectInfo};
use crate::error::Result;
use crate::schema::MetaPayload;

/// Retries transient fetch failures of the wrapped catalog a bounded number
/// of times, sleeping `delay` between attempts. Other errors pass through.
pub struct RetryingCatalog<C> {
    inner: C,
    retries: u32,
    delay: Duration,
}

impl<C: Catalog> RetryingCatalog<C> {
    pub fn new(inner: C, retries: u32, delay: Duration) -> Self {
        RetryingCatalog { inner, retries, delay }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn with_retry<T>(&self, what: &str, call: impl Fn(&C) -> Result<T>) -> Result<T> {
        let mut attempt = 0;
        loop {
            match call(&self.inner) {
                Err(err) if err.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    warn!("{} failed ({}), retry {}/{}", what, err, attempt, self.retries);
                    thread::sleep(self.delay);
                }
                result => return result,
            }
        }
    }
}

impl<C: Catalog> Catalog for RetryingCatalog<C> {
    fn project(&self, project_id: u64) -> Result<Option<ProjectInfo>> {
        self.with_retry("project info", |c| c.project(project_id))
    }

    fn project_meta(&self, project_id: u64) -> Result<MetaPayload> {
        self.with_retry("project meta", |c| c.project_meta(project_id))
    }

    fn datasets(&self, project_id: u64) -> Result<Vec<DatasetInfo>> {
        self.with_retry("dataset listing", |c| c.datasets(project_id))
    }

    fn images(&self, dataset_id: u64) -> Result<Vec<ImageInfo>> {
        self.with_retry("image listing", |c| c.images(dataset_id))
    }

    fn download_annotations(&self, dataset_id: u64, image_ids: &[u64]) -> Result<Vec<AnnotationPayload>> {
        self.with_retry("annotation download", |c| c.download_annotations(dataset_id, image_ids))
    }

    fn images_count(&self, project_id: u64) -> Result<u64> {
        self.with_retry("image count", |c| c.images_count(project_id))
    }
}
