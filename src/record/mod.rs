pub mod columns;
pub mod format;
pub mod record;

pub use columns::{area_key, count_key, Column, ColumnGroup, TableColumns, UNLABELED};
pub use format::{format_row, CellValue, FormattedRow};
pub use record::{build_record, PerImageRecord};
