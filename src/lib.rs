pub mod error;
pub mod logging;
pub mod schema;
pub mod annotation;
pub mod render;
pub mod stats;
pub mod record;
pub mod catalog;
pub mod distribution;
pub mod scan;

// Convenience re-exports
pub use error::{Error, Result};
pub use schema::ProjectMeta;
pub use annotation::{Annotation, AnnotationPayload, Geometry};
pub use render::{render_class_index, ClassIndexRaster};
pub use stats::{extract_stats, ImageStats};
pub use record::{PerImageRecord, TableColumns};
pub use catalog::{Catalog, MemoryCatalog, ProjectDump, RetryingCatalog};
pub use distribution::{compute_distributions, Distributions};
pub use scan::{run_scan, ScanConfig, ScanEvent, ScanReport};
