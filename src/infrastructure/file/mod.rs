mod handle;

pub use handle::{FileHandle, LINE_ENDING};
