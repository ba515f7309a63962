use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory / name decomposition of a file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathInfo {
    /// Parent directory; `.` for a bare file name.
    pub dirname: PathBuf,
    /// File name including extension.
    pub basename: String,
    /// File name without its last extension.
    pub filename: String,
    pub extension: Option<String>,
}

impl PathInfo {
    pub fn from_path(path: &Path) -> Self {
        let dirname = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let basename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let filename = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned());

        Self {
            dirname,
            basename,
            filename,
            extension,
        }
    }

    /// `<dirname>/<filename><suffix>.<extension>`
    pub fn sibling_with_suffix(&self, suffix: &str) -> PathBuf {
        let name = match &self.extension {
            Some(ext) => format!("{}{}.{}", self.filename, suffix, ext),
            None => format!("{}{}", self.filename, suffix),
        };
        self.dirname.join(name)
    }
}
