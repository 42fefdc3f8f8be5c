use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{mpsc, Arc};

use annostat::annotation::{AnnotationPayload, Geometry, ImageSize, ObjectPayload};
use annostat::catalog::{
    generate_project, DatasetDump, DatasetInfo, ImageDump, ImageInfo, ProjectInfo, ProjectKind, SyntheticOptions,
};
use annostat::distribution::OTHER;
use annostat::schema::{ClassPayload, MetaPayload, Rgb};
use annostat::scan::{ScanEvent, TagSelection};
use annostat::stats::round1;
use annostat::{run_scan, Catalog, Error, MemoryCatalog, ProjectDump, Result, ScanConfig};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn rect(class: &str, top: i64, bottom: i64) -> ObjectPayload {
    ObjectPayload {
        class_title: class.into(),
        geometry: Geometry::Rectangle { top, left: 0, bottom, right: 9 },
    }
}

fn image(id: u64, objects: Vec<ObjectPayload>) -> ImageDump {
    ImageDump {
        info: ImageInfo { id, name: format!("img_{}.png", id), channels: 3 },
        annotation: AnnotationPayload { size: ImageSize { height: 10, width: 10 }, objects, tags: vec![] },
    }
}

/// cat covers 40% of image 1, dog 60% of image 2, image 3 is empty.
fn cat_dog_project(dog_color: Rgb) -> ProjectDump {
    ProjectDump {
        project: ProjectInfo { id: 7, name: "pets".into(), kind: ProjectKind::Images },
        meta: MetaPayload {
            classes: vec![
                ClassPayload { title: "cat".into(), color: Rgb::new(255, 0, 0) },
                ClassPayload { title: "dog".into(), color: dog_color },
            ],
            tags: vec![],
        },
        datasets: vec![
            DatasetDump {
                info: DatasetInfo { id: 1, name: "indoor".into() },
                images: vec![image(11, vec![rect("cat", 0, 3)]), image(12, vec![rect("dog", 0, 5)])],
            },
            DatasetDump { info: DatasetInfo { id: 2, name: "outdoor".into() }, images: vec![image(13, vec![])] },
        ],
    }
}

fn cat_dog_catalog() -> MemoryCatalog {
    MemoryCatalog::from_dump(cat_dog_project(Rgb::new(0, 0, 255)))
}

fn config(batch_size: usize) -> ScanConfig {
    ScanConfig { batch_size, ..Default::default() }
}

fn with_channel(mut config: ScanConfig) -> (ScanConfig, mpsc::Receiver<ScanEvent>) {
    let (tx, rx) = mpsc::channel();
    config.progress_tx = Some(tx);
    (config, rx)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_cat_dog_distributions() {
    let report = run_scan(&cat_dog_catalog(), 7, &config(2)).unwrap();
    assert_eq!(report.table.len(), 3);
    assert!(!report.was_stopped);

    let classes = &report.distributions.classes;
    let cat = classes.row("cat").unwrap();
    let dog = classes.row("dog").unwrap();
    assert_eq!(cat.mean_area_pct, 40.0);
    assert_eq!(dog.mean_area_pct, 60.0);
    assert_eq!(cat.images_with, Some(1));
    assert_eq!(cat.images_without, Some(2));
    assert_eq!(format!("{:.2}", cat.with_pct.unwrap()), "33.33");
    assert_eq!(format!("{:.2}", cat.without_pct.unwrap()), "66.67");

    // Unlabeled shares are 60, 40 and 100; none is zero so all count.
    let unlabeled = classes.row("unlabeled").unwrap();
    assert_eq!(round1(unlabeled.mean_area_pct), 66.7);

    let chart = classes.to_chart();
    let with = chart.series("images with").unwrap();
    assert_eq!(with.points[0].text, "1 (33.33%)");
}

#[test]
fn test_batches_cover_every_image_in_order() {
    let (config, rx) = with_channel(config(1));
    let report = run_scan(&cat_dog_catalog(), 7, &config).unwrap();
    drop(config);

    let events: Vec<ScanEvent> = rx.iter().collect();
    let batches: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ScanEvent::Batch(b) => Some(b),
            _ => None,
        })
        .collect();

    let rows: usize = batches.iter().map(|b| b.rows.len()).sum();
    assert_eq!(rows as u64, report.total_images);
    assert_eq!(batches.iter().map(|b| b.progress).collect::<Vec<_>>(), vec![33, 66, 100]);

    let ids: Vec<u64> = report.table.records().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![11, 12, 13]);
    assert_eq!(report.table.records()[2].dataset, "outdoor");

    let charts = events.iter().filter(|e| matches!(e, ScanEvent::Chart(c) if !c.loading)).count();
    assert_eq!(charts, 3);
    assert!(matches!(events.last(), Some(ScanEvent::Finished { images: 3, was_stopped: false })));
}

#[test]
fn test_area_sums_to_hundred_for_every_image() {
    let dump = generate_project(&SyntheticOptions { images_per_dataset: 25, ..Default::default() });
    let catalog = MemoryCatalog::from_dump(dump.clone());
    let report = run_scan(&catalog, dump.project.id, &config(7)).unwrap();

    assert_eq!(report.table.len(), dump.image_count());
    for record in report.table.records() {
        let sum = record.stats.unlabeled_area_pct + record.stats.class_area_pct.iter().sum::<f64>();
        assert_eq!(round1(sum), 100.0, "image {}", record.id);
    }

    let expected: Vec<u64> = dump.datasets.iter().flat_map(|d| d.images.iter().map(|i| i.info.id)).collect();
    let got: Vec<u64> = report.table.records().iter().map(|r| r.id).collect();
    assert_eq!(got, expected);

    let buckets = &report.distributions.resolutions.buckets;
    assert!(buckets.len() <= 11);
    let images: u64 = buckets.iter().map(|b| b.images).sum();
    assert_eq!(images, report.total_images);
    if buckets.len() == 11 {
        assert_eq!(buckets[10].label, OTHER);
    }
}

#[test]
fn test_parallel_and_sequential_rendering_agree() {
    let dump = generate_project(&SyntheticOptions { seed: 3, images_per_dataset: 12, ..Default::default() });
    let catalog = MemoryCatalog::from_dump(dump);
    let parallel = run_scan(&catalog, 1, &config(5)).unwrap();
    let sequential = run_scan(&catalog, 1, &ScanConfig { parallel_render: false, ..config(5) }).unwrap();
    assert_eq!(parallel.table, sequential.table);
    assert_eq!(parallel.distributions, sequential.distributions);
}

#[test]
fn test_zero_image_project() {
    let mut dump = cat_dog_project(Rgb::new(0, 0, 255));
    for dataset in &mut dump.datasets {
        dataset.images.clear();
    }
    let (config, rx) = with_channel(config(4));
    let report = run_scan(&MemoryCatalog::from_dump(dump), 7, &config).unwrap();
    drop(config);

    let events: Vec<ScanEvent> = rx.iter().collect();
    assert_eq!(events[0], ScanEvent::Progress(100));
    assert!(!events.iter().any(|e| matches!(e, ScanEvent::Batch(_))));
    assert!(report.table.is_empty());
    assert_eq!(report.distributions.classes.row("cat").unwrap().mean_area_pct, 0.0);
    assert!(report.distributions.resolutions.buckets.is_empty());
}

#[test]
fn test_configuration_errors_abort_before_scanning() {
    let (cfg, rx) = with_channel(config(2));
    assert!(matches!(run_scan(&cat_dog_catalog(), 99, &cfg), Err(Error::ProjectNotFound(99))));

    let mut dump = cat_dog_project(Rgb::new(0, 0, 255));
    dump.project.kind = ProjectKind::Videos;
    let err = run_scan(&MemoryCatalog::from_dump(dump), 7, &cfg).unwrap_err();
    assert!(matches!(err, Error::WrongProjectKind { ref kind, .. } if kind == "videos"));

    let repeated = ScanConfig { tags: TagSelection::Only(vec!["night".into(), "night".into()]), ..cfg.clone() };
    assert!(matches!(run_scan(&cat_dog_catalog(), 7, &repeated), Err(Error::Config(_))));

    drop(cfg);
    drop(repeated);
    assert_eq!(rx.iter().count(), 0);
}

#[test]
fn test_duplicate_color_is_a_warning() {
    let catalog = MemoryCatalog::from_dump(cat_dog_project(Rgb::new(255, 0, 0)));
    let (config, rx) = with_channel(config(10));
    let report = run_scan(&catalog, 7, &config).unwrap();
    drop(config);

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.table.len(), 3);
    assert!(matches!(rx.iter().next(), Some(ScanEvent::Warning(_))));
}

#[test]
fn test_no_tags_requested() {
    let catalog = cat_dog_catalog();
    let config = ScanConfig { tags: TagSelection::Only(vec![]), ..config(10) };
    let report = run_scan(&catalog, 7, &config).unwrap();

    assert!(report.distributions.tags.is_none());
    assert!(report.distributions.charts()[1].series.is_empty());
    assert!(report.table.records().iter().all(|r| r.stats.tag_presence.is_none()));
    assert!(report.formatted_rows()[0].get("night").is_none());
}

// ---------------------------------------------------------------------------
// Stopping
// ---------------------------------------------------------------------------

/// Delegates to a memory catalog and raises the stop flag on the first
/// annotation download.
struct StopAfterFirstBatch {
    inner: MemoryCatalog,
    flag: Arc<AtomicBool>,
}

impl Catalog for StopAfterFirstBatch {
    fn project(&self, id: u64) -> Result<Option<ProjectInfo>> {
        self.inner.project(id)
    }
    fn project_meta(&self, id: u64) -> Result<MetaPayload> {
        self.inner.project_meta(id)
    }
    fn datasets(&self, id: u64) -> Result<Vec<DatasetInfo>> {
        self.inner.datasets(id)
    }
    fn images(&self, id: u64) -> Result<Vec<ImageInfo>> {
        self.inner.images(id)
    }
    fn download_annotations(&self, dataset_id: u64, ids: &[u64]) -> Result<Vec<AnnotationPayload>> {
        self.flag.store(true, Ordering::Relaxed);
        self.inner.download_annotations(dataset_id, ids)
    }
    fn images_count(&self, id: u64) -> Result<u64> {
        self.inner.images_count(id)
    }
}

#[test]
fn test_stop_flag_keeps_finished_batches() {
    let flag = Arc::new(AtomicBool::new(false));
    let catalog = StopAfterFirstBatch { inner: cat_dog_catalog(), flag: flag.clone() };
    let (mut config, rx) = with_channel(config(1));
    config.stop_flag = Some(flag);

    let report = run_scan(&catalog, 7, &config).unwrap();
    drop(config);

    assert!(report.was_stopped);
    assert_eq!(report.table.len(), 1);
    assert_eq!(report.distributions.classes.total_images, 1);
    // Presence shares are over the processed images, not the project total.
    let cat = report.distributions.classes.row("cat").unwrap();
    assert_eq!(cat.with_pct, Some(100.0));
    assert_eq!(cat.without_pct, Some(0.0));
    let events: Vec<ScanEvent> = rx.iter().collect();
    assert!(matches!(events.last(), Some(ScanEvent::Finished { images: 1, was_stopped: true })));
}

#[test]
fn test_dropped_receiver_stops_the_scan() {
    let (config, rx) = with_channel(config(2));
    drop(rx);
    let report = run_scan(&cat_dog_catalog(), 7, &config).unwrap();
    assert!(report.was_stopped);
    assert_eq!(report.table.len(), 2);
}

// ---------------------------------------------------------------------------
// Fetch failures
// ---------------------------------------------------------------------------

/// Fails the first annotation download with a transient error.
struct FlakyDownloads {
    inner: MemoryCatalog,
    failures: AtomicU32,
}

impl Catalog for FlakyDownloads {
    fn project(&self, id: u64) -> Result<Option<ProjectInfo>> {
        self.inner.project(id)
    }
    fn project_meta(&self, id: u64) -> Result<MetaPayload> {
        self.inner.project_meta(id)
    }
    fn datasets(&self, id: u64) -> Result<Vec<DatasetInfo>> {
        self.inner.datasets(id)
    }
    fn images(&self, id: u64) -> Result<Vec<ImageInfo>> {
        self.inner.images(id)
    }
    fn download_annotations(&self, dataset_id: u64, ids: &[u64]) -> Result<Vec<AnnotationPayload>> {
        if self.failures.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(Error::Fetch("connection reset".into()));
        }
        self.inner.download_annotations(dataset_id, ids)
    }
    fn images_count(&self, id: u64) -> Result<u64> {
        self.inner.images_count(id)
    }
}

fn flaky() -> FlakyDownloads {
    FlakyDownloads { inner: cat_dog_catalog(), failures: AtomicU32::new(0) }
}

#[test]
fn test_fetch_failure_aborts_without_retries() {
    assert!(matches!(run_scan(&flaky(), 7, &config(2)), Err(Error::Fetch(_))));
}

#[test]
fn test_fetch_failure_recovers_with_retries() {
    let config = ScanConfig { fetch_retries: 1, retry_delay_ms: 0, ..config(2) };
    let report = run_scan(&flaky(), 7, &config).unwrap();
    assert_eq!(report.table.len(), 3);
}
