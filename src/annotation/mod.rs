pub mod annotation;
pub mod geometry;

pub use annotation::{Annotation, AnnotationPayload, ImageSize, ObjectPayload, Shape, TagRef};
pub use geometry::{BitMask, Geometry};
