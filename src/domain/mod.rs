pub mod error;
pub mod mime;
pub mod open_mode;
pub mod path_info;

// CSV row and reader settings
pub mod csv;
