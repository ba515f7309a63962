//! File handles that open lazily and close themselves, with CSV and image
//! helpers built on top.
//!
//! ```no_run
//! use filewrap::CsvReader;
//!
//! let mut reader = CsvReader::open("people.csv")?;
//! while let Some(row) = reader.next_row()? {
//!     println!("{:?}", row.get("name"));
//! }
//! # Ok::<(), filewrap::FileError>(())
//! ```

pub mod domain;
pub mod infrastructure;
mod shared;

pub use domain::csv::{CsvConfig, RawRow, Row};
pub use domain::error::{FileError, Result};
pub use domain::mime::MimeInfo;
pub use domain::open_mode::{Access, OpenMode};
pub use domain::path_info::PathInfo;
pub use infrastructure::config::FilewrapConfig;
pub use infrastructure::csv::CsvReader;
pub use infrastructure::file::{FileHandle, LINE_ENDING};
pub use infrastructure::image::ImageHandle;
pub use infrastructure::logging::init_logging;
pub use infrastructure::mime::MimeDetector;
