//! Deterministic synthetic projects for demos and tests.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::annotation::{AnnotationPayload, Geometry, ImageSize, ObjectPayload, TagRef};
use crate::catalog::memory::{DatasetDump, ImageDump, ProjectDump};
use crate::catalog::{DatasetInfo, ImageInfo, ProjectInfo, ProjectKind};
use crate::schema::{ClassPayload, MetaPayload, Rgb, TagPayload};

const CLASS_NAMES: [&str; 8] = ["car", "person", "road", "tree", "sky", "bicycle", "sign", "building"];
const TAG_NAMES: [&str; 4] = ["night", "rain", "blurry", "occluded"];

/// (height, width, channels); more than ten so histograms get an "other" bucket.
const RESOLUTIONS: [(usize, usize, u32); 13] = [
    (48, 64, 3),
    (64, 64, 3),
    (60, 80, 3),
    (72, 96, 3),
    (90, 120, 3),
    (96, 128, 3),
    (120, 160, 3),
    (64, 64, 1),
    (48, 64, 1),
    (128, 128, 3),
    (100, 100, 3),
    (64, 48, 3),
    (80, 60, 4),
];

/// Size and shape of a generated project.
#[derive(Debug, Clone)]
pub struct SyntheticOptions {
    pub seed: u64,
    pub datasets: usize,
    pub images_per_dataset: usize,
    /// Number of classes, at most 8.
    pub classes: usize,
    /// Number of tags, at most 4.
    pub tags: usize,
    pub max_shapes: usize,
}

impl Default for SyntheticOptions {
    fn default() -> Self {
        SyntheticOptions { seed: 42, datasets: 3, images_per_dataset: 40, classes: 5, tags: 2, max_shapes: 6 }
    }
}

/// Generates a project; the same options always yield the same dump.
pub fn generate_project(options: &SyntheticOptions) -> ProjectDump {
    let mut rng = StdRng::seed_from_u64(options.seed);

    let classes: Vec<ClassPayload> = CLASS_NAMES
        .iter()
        .take(options.classes)
        .map(|name| ClassPayload { title: name.to_string(), color: random_color(&mut rng) })
        .collect();
    let tags: Vec<TagPayload> = TAG_NAMES
        .iter()
        .take(options.tags)
        .map(|name| TagPayload { name: name.to_string(), color: random_color(&mut rng) })
        .collect();

    let mut next_image_id = 1000u64;
    let datasets = (0..options.datasets)
        .map(|d| {
            let images = (0..options.images_per_dataset)
                .map(|i| {
                    let id = next_image_id;
                    next_image_id += 1;
                    let (height, width, channels) = pick_resolution(&mut rng);
                    let size = ImageSize { height, width };
                    ImageDump {
                        info: ImageInfo { id, name: format!("ds{}_img{:04}.png", d, i), channels },
                        annotation: random_annotation(&mut rng, size, &classes, &tags, options.max_shapes),
                    }
                })
                .collect();
            DatasetDump { info: DatasetInfo { id: 100 + d as u64, name: format!("dataset_{:02}", d) }, images }
        })
        .collect();

    ProjectDump {
        project: ProjectInfo { id: 1, name: "synthetic".into(), kind: ProjectKind::Images },
        meta: MetaPayload { classes, tags },
        datasets,
    }
}

fn random_color(rng: &mut StdRng) -> Rgb {
    Rgb::new(rng.gen(), rng.gen(), rng.gen())
}

/// Skewed towards the first entries so frequencies differ.
fn pick_resolution(rng: &mut StdRng) -> (usize, usize, u32) {
    let a = rng.gen_range(0..RESOLUTIONS.len());
    let b = rng.gen_range(0..RESOLUTIONS.len());
    RESOLUTIONS[a.min(b)]
}

fn random_annotation(
    rng: &mut StdRng,
    size: ImageSize,
    classes: &[ClassPayload],
    tags: &[TagPayload],
    max_shapes: usize,
) -> AnnotationPayload {
    let n_shapes = if classes.is_empty() { 0 } else { rng.gen_range(0..=max_shapes) };
    let objects = (0..n_shapes)
        .filter_map(|_| {
            let class = classes.choose(&mut *rng)?;
            Some(ObjectPayload { class_title: class.title.clone(), geometry: random_geometry(rng, size) })
        })
        .collect();
    let tags = tags
        .iter()
        .filter(|_| rng.gen_bool(0.3))
        .map(|t| TagRef { name: t.name.clone() })
        .collect();
    AnnotationPayload { size, objects, tags }
}

fn random_geometry(rng: &mut StdRng, size: ImageSize) -> Geometry {
    let (h, w) = (size.height as i64, size.width as i64);
    match rng.gen_range(0..4) {
        0 => {
            // May extend past the right/bottom edge.
            let top = rng.gen_range(0..h);
            let left = rng.gen_range(0..w);
            Geometry::Rectangle {
                top,
                left,
                bottom: top + rng.gen_range(0..h / 2 + 1),
                right: left + rng.gen_range(0..w / 2 + 1),
            }
        }
        1 => {
            let cx = rng.gen_range(0.0..w as f64);
            let cy = rng.gen_range(0.0..h as f64);
            let r = rng.gen_range(2.0..(h.min(w) as f64 / 3.0).max(3.0));
            let n = rng.gen_range(3..8);
            let exterior = (0..n)
                .map(|k| {
                    let angle = k as f64 / n as f64 * std::f64::consts::TAU;
                    [cx + r * angle.cos(), cy + r * angle.sin()]
                })
                .collect();
            Geometry::Polygon { exterior, interior: vec![] }
        }
        2 => {
            let points = (0..rng.gen_range(2..5))
                .map(|_| [rng.gen_range(0.0..w as f64), rng.gen_range(0.0..h as f64)])
                .collect();
            Geometry::Polyline { points }
        }
        _ => Geometry::Point { x: rng.gen_range(0..w), y: rng.gen_range(0..h) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_is_deterministic() {
        let options = SyntheticOptions { images_per_dataset: 5, ..Default::default() };
        assert_eq!(generate_project(&options), generate_project(&options));
    }

    #[test]
    fn test_generated_layout() {
        let options = SyntheticOptions { datasets: 2, images_per_dataset: 4, classes: 3, tags: 1, ..Default::default() };
        let dump = generate_project(&options);
        assert_eq!(dump.image_count(), 8);
        assert_eq!(dump.meta.classes.len(), 3);
        assert_eq!(dump.meta.tags.len(), 1);
        for image in dump.datasets.iter().flat_map(|d| d.images.iter()) {
            assert!(image.annotation.objects.len() <= options.max_shapes);
            assert!(image
                .annotation
                .objects
                .iter()
                .all(|o| dump.meta.classes.iter().any(|c| c.title == o.class_title)));
        }
    }
}
