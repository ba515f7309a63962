pub mod config;
pub mod csv;
pub mod file;
pub mod image;
pub mod logging;
pub mod mime;
