// ============================================================
// LIBRARY CONFIGURATION
// ============================================================
// Defaults, then an optional TOML file, then FILEWRAP_* environment
// variables. Nested keys use a double underscore: FILEWRAP_CSV__DELIMITER.

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::domain::csv::CsvConfig;
use crate::domain::error::{FileError, Result};
use crate::domain::open_mode::OpenMode;
use crate::infrastructure::csv::CsvReader;
use crate::infrastructure::file::FileHandle;
use crate::infrastructure::logging;

pub const ENV_PREFIX: &str = "FILEWRAP_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilewrapConfig {
    /// Mode used when a caller does not pick one (default: "rb")
    pub default_mode: String,

    /// `EnvFilter` directive for [`init_logging`](crate::infrastructure::logging::init_logging)
    pub log_filter: String,

    pub csv: CsvConfig,
}

impl Default for FilewrapConfig {
    fn default() -> Self {
        Self {
            default_mode: OpenMode::default().to_string(),
            log_filter: "info".to_string(),
            csv: CsvConfig::default(),
        }
    }
}

impl FilewrapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider chain behind [`load`](Self::load)
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate. A missing TOML file is skipped.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(file).extract()?;
        config.validate().map_err(FileError::Config)?;
        debug!(
            file = ?file.map(|f| f.display().to_string()),
            default_mode = %config.default_mode,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn open_mode(&self) -> Result<OpenMode> {
        OpenMode::from_str(&self.default_mode).map_err(FileError::Config)
    }

    /// Handle over `path` in `default_mode`
    pub fn open_file(&self, path: impl AsRef<Path>) -> Result<FileHandle> {
        FileHandle::new(path, self.open_mode()?)
    }

    /// CSV reader over `path` using `default_mode` and the `csv` settings
    pub fn csv_reader(&self, path: impl AsRef<Path>) -> Result<CsvReader> {
        CsvReader::with_config(self.open_file(path)?, &self.csv)
    }

    /// Install the global subscriber with `log_filter`. See
    /// [`logging::init_logging`].
    pub fn init_logging(&self) -> bool {
        logging::init_logging(&self.log_filter)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        OpenMode::from_str(&self.default_mode)?;
        if self.log_filter.trim().is_empty() {
            return Err("log_filter must not be empty".to_string());
        }
        self.csv.validate()
    }
}
