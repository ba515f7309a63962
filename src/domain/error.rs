use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FileError {
    NotFound {
        path: PathBuf,
    },
    Io {
        path: PathBuf,
        message: String,
    },
    HeadersAlreadyRead {
        path: PathBuf,
    },
    HeaderOutOfRange {
        path: PathBuf,
        index: usize,
        len: usize,
    },
    Csv {
        path: PathBuf,
        message: String,
    },
    Encoding {
        path: PathBuf,
        message: String,
    },
    Image {
        path: PathBuf,
        message: String,
    },
    Unsupported {
        path: PathBuf,
        message: String,
    },
    Config(String),
}

impl FileError {
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FileError::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn csv(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FileError::Csv {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn encoding(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FileError::Encoding {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn image(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FileError::Image {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The path of the file that caused the error, if the error is tied to one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            FileError::NotFound { path }
            | FileError::Io { path, .. }
            | FileError::HeadersAlreadyRead { path }
            | FileError::HeaderOutOfRange { path, .. }
            | FileError::Csv { path, .. }
            | FileError::Encoding { path, .. }
            | FileError::Image { path, .. }
            | FileError::Unsupported { path, .. } => Some(path),
            FileError::Config(_) => None,
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::NotFound { path } => write!(f, "File not found: {}", path.display()),
            FileError::Io { path, message } => {
                write!(f, "IO error on {}: {}", path.display(), message)
            }
            FileError::HeadersAlreadyRead { path } => write!(
                f,
                "Can't read headers of {}: reading already started",
                path.display()
            ),
            FileError::HeaderOutOfRange { path, index, len } => write!(
                f,
                "Header index {} out of range for {} ({} headers)",
                index,
                path.display(),
                len
            ),
            FileError::Csv { path, message } => {
                write!(f, "CSV error in {}: {}", path.display(), message)
            }
            FileError::Encoding { path, message } => {
                write!(f, "Encoding error in {}: {}", path.display(), message)
            }
            FileError::Image { path, message } => {
                write!(f, "Image error in {}: {}", path.display(), message)
            }
            FileError::Unsupported { path, message } => {
                write!(f, "Unsupported operation on {}: {}", path.display(), message)
            }
            FileError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for FileError {}

impl From<figment::Error> for FileError {
    fn from(err: figment::Error) -> Self {
        FileError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FileError>;
