pub mod extract;
pub mod rounding;

pub use extract::{extract_stats, ImageStats};
pub use rounding::{apportion_percentages, round1, round2};
