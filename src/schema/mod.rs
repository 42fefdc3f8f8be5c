pub mod color;
pub mod meta;

pub use color::Rgb;
pub use meta::{ClassPayload, MetaPayload, ObjectClass, ProjectMeta, SchemaWarning, TagMeta, TagPayload};
