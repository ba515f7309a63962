// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Row and configuration types for the CSV reader
// No I/O

mod csv_config;
mod csv_row;

pub use csv_config::CsvConfig;
pub use csv_row::{RawRow, Row};
