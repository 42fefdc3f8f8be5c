pub mod raster;
pub mod renderer;

pub use raster::ClassIndexRaster;
pub use renderer::{draw_geometry, render_class_index};
