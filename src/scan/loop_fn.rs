use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::annotation::{Annotation, AnnotationPayload};
use crate::catalog::{Catalog, ImageInfo, ProjectKind, RetryingCatalog};
use crate::distribution::compute_distributions;
use crate::error::{Error, Result};
use crate::logging::DatasetProgress;
use crate::record::{build_record, PerImageRecord, TableColumns};
use crate::render::render_class_index;
use crate::scan::aggregator::BatchAggregator;
use crate::scan::event::{ChartPayload, ChartSlot, ScanEvent};
use crate::scan::report::ScanReport;
use crate::scan::scan_config::ScanConfig;
use crate::schema::ProjectMeta;
use crate::stats::extract_stats;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Scans every image of `project_id` and returns the per-image table plus the
/// final distributions.
///
/// # Arguments
/// - `catalog`: where project metadata and annotations come from
/// - `project_id`: the image project to scan
/// - `config`: batch size, tag selection, optional progress channel,
///   optional stop flag
///
/// # Errors
/// - `ProjectNotFound` / `WrongProjectKind` before anything is scanned
/// - `Config` for an invalid config or schema
/// - `UnknownClass` when an annotation names a class the schema lacks
/// - `Fetch` when the catalog fails (after `fetch_retries` extra attempts)
///
/// # Early termination
/// The scan stops between batches if:
/// - `config.stop_flag` is set to `true`, **or**
/// - the `progress_tx` receiver has been dropped.
///
/// The returned report then covers the images processed so far and has
/// `was_stopped` set.
pub fn run_scan<C: Catalog + ?Sized>(catalog: &C, project_id: u64, config: &ScanConfig) -> Result<ScanReport> {
    config.validate()?;
    if config.fetch_retries > 0 {
        let retrying = RetryingCatalog::new(
            catalog,
            config.fetch_retries,
            Duration::from_millis(config.retry_delay_ms),
        );
        scan_project(&retrying, project_id, config)
    } else {
        scan_project(catalog, project_id, config)
    }
}

/// Turns one downloaded annotation into a table record: resolve classes,
/// render the label mask, read the statistics.
pub fn process_image(
    info: &ImageInfo,
    dataset_name: &str,
    payload: &AnnotationPayload,
    meta: &ProjectMeta,
    tag_names: &[String],
) -> Result<PerImageRecord> {
    let ann = Annotation::from_payload(payload, meta, info.id)?;
    let raster = render_class_index(&ann);
    let stats = extract_stats(&raster, &ann, meta, tag_names);
    Ok(build_record(info, dataset_name, ann.img_size, stats))
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn scan_project<C: Catalog + ?Sized>(catalog: &C, project_id: u64, config: &ScanConfig) -> Result<ScanReport> {
    let t_start = Instant::now();

    let project = catalog.project(project_id)?.ok_or(Error::ProjectNotFound(project_id))?;
    if project.kind != ProjectKind::Images {
        return Err(Error::WrongProjectKind {
            name: project.name.clone(),
            kind: project.kind.as_str().to_string(),
        });
    }

    let meta = ProjectMeta::from_payload(&catalog.project_meta(project_id)?)?;
    let mut warnings = Vec::new();
    for warning in meta.warnings() {
        let text = warning.to_string();
        warn!("{}", text);
        emit(config, ScanEvent::Warning(text.clone()));
        warnings.push(text);
    }

    let tag_names = config.tag_names(&meta);
    let columns = TableColumns::new(&meta, &tag_names);
    let total_images = catalog.images_count(project_id)?;
    info!(
        "Scanning project {:?}: {} classes, {} tags, {} images",
        project.name,
        meta.class_count(),
        tag_names.len(),
        total_images
    );

    let mut aggregator = BatchAggregator::new(columns.clone(), total_images);
    let mut was_stopped = false;

    if total_images == 0 {
        emit(config, ScanEvent::Progress(100));
    } else {
        'datasets: for dataset in catalog.datasets(project_id)? {
            let images = catalog.images(dataset.id)?;
            let mut progress = DatasetProgress::new(&dataset.name, images.len());

            for batch in images.chunks(config.batch_size) {
                if stop_requested(config) {
                    was_stopped = true;
                    break 'datasets;
                }

                let ids: Vec<u64> = batch.iter().map(|img| img.id).collect();
                let payloads = catalog.download_annotations(dataset.id, &ids)?;
                if payloads.len() != batch.len() {
                    return Err(Error::Fetch(format!(
                        "dataset {}: requested {} annotations, got {}",
                        dataset.id,
                        batch.len(),
                        payloads.len()
                    )));
                }

                let records = process_batch(batch, &payloads, &dataset.name, &meta, &tag_names, config.parallel_render)?;
                progress.iters_done(records.len());

                let payload = aggregator.push_batch(records);
                debug!("Batch {}: {}% of images processed", aggregator.batches(), payload.progress);
                if !emit(config, ScanEvent::Batch(payload)) {
                    was_stopped = true;
                    break 'datasets;
                }
            }

            if progress.is_complete() {
                debug!("Dataset {} done: {} images", dataset.name, progress.done());
            }
        }
    }

    let table = aggregator.finish();
    let distributions = compute_distributions(table.records(), &meta, &columns, config.top_resolutions);

    let slots = [ChartSlot::Classes, ChartSlot::Tags, ChartSlot::Resolutions];
    for (slot, chart) in slots.into_iter().zip(distributions.charts()) {
        emit(config, ScanEvent::Chart(ChartPayload { slot, chart, loading: false }));
    }
    emit(config, ScanEvent::Finished { images: table.len(), was_stopped });

    let elapsed_ms = t_start.elapsed().as_millis() as u64;
    if was_stopped {
        info!("Scan stopped after {} of {} images", table.len(), total_images);
    } else {
        info!("Scan finished: {} images in {} ms", table.len(), elapsed_ms);
    }

    Ok(ScanReport {
        project,
        total_images,
        columns,
        table,
        distributions,
        warnings,
        was_stopped,
        elapsed_ms,
    })
}

/// Processes one batch, keeping the listing order of `batch`.
fn process_batch(
    batch: &[ImageInfo],
    payloads: &[AnnotationPayload],
    dataset_name: &str,
    meta: &ProjectMeta,
    tag_names: &[String],
    parallel: bool,
) -> Result<Vec<PerImageRecord>> {
    if parallel {
        batch
            .par_iter()
            .zip(payloads.par_iter())
            .map(|(info, payload)| process_image(info, dataset_name, payload, meta, tag_names))
            .collect()
    } else {
        batch
            .iter()
            .zip(payloads)
            .map(|(info, payload)| process_image(info, dataset_name, payload, meta, tag_names))
            .collect()
    }
}

fn stop_requested(config: &ScanConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}

/// Sends `event` if a channel is configured. Returns false once the
/// receiver has been dropped.
fn emit(config: &ScanConfig, event: ScanEvent) -> bool {
    match config.progress_tx {
        Some(ref tx) => tx.send(event).is_ok(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Geometry, ImageSize, ObjectPayload, TagRef};
    use crate::schema::{ClassPayload, MetaPayload, Rgb, TagPayload};

    fn meta() -> ProjectMeta {
        ProjectMeta::from_payload(&MetaPayload {
            classes: vec![ClassPayload { title: "cat".into(), color: Rgb::new(255, 0, 0) }],
            tags: vec![TagPayload { name: "night".into(), color: Rgb::new(0, 0, 0) }],
        })
        .unwrap()
    }

    fn payload(class: &str) -> AnnotationPayload {
        AnnotationPayload {
            size: ImageSize { height: 4, width: 5 },
            objects: vec![ObjectPayload {
                class_title: class.into(),
                geometry: Geometry::Rectangle { top: 0, left: 0, bottom: 1, right: 4 },
            }],
            tags: vec![TagRef { name: "night".into() }],
        }
    }

    #[test]
    fn test_process_image() {
        let info = ImageInfo { id: 3, name: "a.png".into(), channels: 3 };
        let record = process_image(&info, "train", &payload("cat"), &meta(), &["night".to_string()]).unwrap();
        assert_eq!((record.height, record.width), (4, 5));
        assert_eq!(record.stats.class_area_pct, vec![50.0]);
        assert_eq!(record.stats.unlabeled_area_pct, 50.0);
        assert_eq!(record.stats.class_count, vec![1]);
        assert_eq!(record.stats.tag_presence, Some(vec![1]));
    }

    #[test]
    fn test_process_image_unknown_class() {
        let info = ImageInfo { id: 3, name: "a.png".into(), channels: 3 };
        let err = process_image(&info, "train", &payload("dog"), &meta(), &[]).unwrap_err();
        assert!(matches!(err, Error::UnknownClass { image: 3, .. }));
    }

    #[test]
    fn test_parallel_batch_keeps_order() {
        let batch: Vec<ImageInfo> = (0..20)
            .map(|id| ImageInfo { id, name: format!("{}.png", id), channels: 3 })
            .collect();
        let payloads: Vec<AnnotationPayload> = (0..20).map(|_| payload("cat")).collect();
        let records = process_batch(&batch, &payloads, "ds", &meta(), &[], true).unwrap();
        let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, (0..20).collect::<Vec<u64>>());
    }
}
