use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::render::ClassIndexRaster;
use crate::schema::ProjectMeta;
use crate::stats::rounding::apportion_percentages;

/// Statistics of one image, in schema declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageStats {
    /// Share of pixels no shape covers, in percent.
    pub unlabeled_area_pct: f64,
    /// Per-class share of pixels, in percent. One decimal; sums with the
    /// unlabeled share to exactly 100.
    pub class_area_pct: Vec<f64>,
    /// Per-class number of shapes, regardless of overlap.
    pub class_count: Vec<u32>,
    /// Per requested tag, 1 when present. `None` when no tag was requested.
    pub tag_presence: Option<Vec<u32>>,
}

/// Reads area, count and tag statistics for one image.
///
/// One pass over the raster and one over the shape list; the raster is not
/// modified. A zero-sized raster counts as fully unlabeled.
pub fn extract_stats(
    raster: &ClassIndexRaster,
    ann: &Annotation,
    meta: &ProjectMeta,
    tag_names: &[String],
) -> ImageStats {
    let n_classes = meta.class_count();

    let pixel_counts = raster.pixel_counts(n_classes);
    let (unlabeled_area_pct, class_area_pct) = if raster.is_empty() {
        (100.0, vec![0.0; n_classes])
    } else {
        let mut pct = apportion_percentages(&pixel_counts, raster.len() as u64);
        let unlabeled = pct.remove(0);
        (unlabeled, pct)
    };

    let mut class_count = vec![0u32; n_classes];
    for shape in &ann.shapes {
        let slot = (shape.class_index as usize)
            .checked_sub(1)
            .and_then(|i| class_count.get_mut(i));
        if let Some(slot) = slot {
            *slot += 1;
        }
    }

    let tag_presence = if tag_names.is_empty() {
        None
    } else {
        Some(tag_names.iter().map(|name| u32::from(ann.has_tag(name))).collect())
    };

    ImageStats { unlabeled_area_pct, class_area_pct, class_count, tag_presence }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Geometry, ImageSize, Shape};
    use crate::render::render_class_index;
    use crate::schema::{ClassPayload, MetaPayload, Rgb};
    use crate::stats::round1;

    fn meta() -> ProjectMeta {
        ProjectMeta::from_payload(&MetaPayload {
            classes: vec![
                ClassPayload { title: "cat".into(), color: Rgb::new(255, 0, 0) },
                ClassPayload { title: "dog".into(), color: Rgb::new(0, 0, 255) },
                ClassPayload { title: "owl".into(), color: Rgb::new(0, 255, 0) },
            ],
            tags: vec![],
        })
        .unwrap()
    }

    fn rect(meta: &ProjectMeta, class: &str, top: i64, left: i64, bottom: i64, right: i64) -> Shape {
        Shape {
            class_name: class.into(),
            class_index: meta.index_of(class).unwrap(),
            geometry: Geometry::Rectangle { top, left, bottom, right },
        }
    }

    fn ann(shapes: Vec<Shape>, tags: &[&str]) -> Annotation {
        Annotation {
            img_size: ImageSize { height: 10, width: 10 },
            shapes,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_area_percentages() {
        let m = meta();
        let a = ann(vec![rect(&m, "cat", 0, 0, 3, 9), rect(&m, "dog", 4, 0, 4, 4)], &[]);
        let stats = extract_stats(&render_class_index(&a), &a, &m, &[]);
        assert_eq!(stats.class_area_pct, vec![40.0, 5.0, 0.0]);
        assert_eq!(stats.unlabeled_area_pct, 55.0);
        assert_eq!(stats.tag_presence, None);
    }

    #[test]
    fn test_counts_ignore_overlap() {
        let m = meta();
        let a = ann(
            vec![
                rect(&m, "cat", 0, 0, 5, 5),
                rect(&m, "cat", 2, 2, 6, 6),
                rect(&m, "cat", 0, 0, 5, 5),
                rect(&m, "owl", 20, 20, 30, 30),
            ],
            &[],
        );
        let stats = extract_stats(&render_class_index(&a), &a, &m, &[]);
        assert_eq!(stats.class_count, vec![3, 0, 1]);
        // Off-image shape still counts but covers nothing.
        assert_eq!(stats.class_area_pct[2], 0.0);
    }

    #[test]
    fn test_area_always_sums_to_hundred() {
        let m = meta();
        let a = Annotation {
            img_size: ImageSize { height: 3, width: 7 },
            shapes: vec![rect(&m, "cat", 0, 0, 0, 2), rect(&m, "dog", 1, 0, 2, 3), rect(&m, "owl", 0, 6, 2, 6)],
            tags: Default::default(),
        };
        let stats = extract_stats(&render_class_index(&a), &a, &m, &[]);
        let sum = stats.unlabeled_area_pct + stats.class_area_pct.iter().sum::<f64>();
        assert_eq!(round1(sum), 100.0);
    }

    #[test]
    fn test_tag_presence_in_request_order() {
        let m = meta();
        let a = ann(vec![], &["night", "blurry"]);
        let tags = vec!["blurry".to_string(), "rain".to_string(), "night".to_string()];
        let stats = extract_stats(&render_class_index(&a), &a, &m, &tags);
        assert_eq!(stats.tag_presence, Some(vec![1, 0, 1]));
        assert_eq!(stats.unlabeled_area_pct, 100.0);
    }

    #[test]
    fn test_zero_sized_image() {
        let m = meta();
        let a = Annotation {
            img_size: ImageSize { height: 0, width: 0 },
            shapes: vec![rect(&m, "dog", 0, 0, 1, 1)],
            tags: Default::default(),
        };
        let stats = extract_stats(&render_class_index(&a), &a, &m, &[]);
        assert_eq!(stats.unlabeled_area_pct, 100.0);
        assert_eq!(stats.class_area_pct, vec![0.0, 0.0, 0.0]);
        assert_eq!(stats.class_count, vec![0, 1, 0]);
    }
}
