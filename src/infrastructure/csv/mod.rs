// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV row reading, header mapping, and field re-encoding

mod csv_reader;
mod encoding;

pub use csv_reader::CsvReader;
pub use encoding::{encoding_for_charset, AutoEncoder};
