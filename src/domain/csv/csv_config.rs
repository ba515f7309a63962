// ============================================================
// CSV READER CONFIGURATION
// ============================================================
// Defaults for header mapping, auto-encoding and dialect

use serde::{Deserialize, Serialize};

/// Configuration for a CSV reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Treat the first record as column names (default: true)
    pub headers_enabled: bool,

    /// Re-encode and trim every field value (default: true)
    pub auto_encode_enabled: bool,

    /// Encoding label values are converted into (default: "UTF-8")
    pub target_encoding: String,

    /// Field separator (default: ',')
    pub delimiter: char,

    /// Quote character (default: '"')
    pub quote: char,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            headers_enabled: true,
            auto_encode_enabled: true,
            target_encoding: "UTF-8".to_string(),
            delimiter: ',',
            quote: '"',
        }
    }
}

impl CsvConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Config that hands back fields exactly as parsed
    pub fn raw() -> Self {
        Self {
            headers_enabled: false,
            auto_encode_enabled: false,
            ..Default::default()
        }
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set custom quote character
    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !self.delimiter.is_ascii() {
            return Err("delimiter must be a single ASCII character".to_string());
        }
        if !self.quote.is_ascii() {
            return Err("quote must be a single ASCII character".to_string());
        }
        if self.delimiter == self.quote {
            return Err("delimiter and quote must differ".to_string());
        }
        if matches!(self.delimiter, '\n' | '\r') {
            return Err("delimiter cannot be a line terminator".to_string());
        }
        if encoding_rs::Encoding::for_label(self.target_encoding.trim().as_bytes()).is_none() {
            return Err(format!(
                "unknown target encoding '{}'",
                self.target_encoding
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CsvConfig::default();
        assert!(config.headers_enabled);
        assert!(config.auto_encode_enabled);
        assert_eq!(config.target_encoding, "UTF-8");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_raw_disables_processing() {
        let config = CsvConfig::raw();
        assert!(!config.headers_enabled);
        assert!(!config.auto_encode_enabled);
    }

    #[test]
    fn test_validate_rejects_bad_dialect() {
        assert!(CsvConfig::new().with_delimiter('"').validate().is_err());
        assert!(CsvConfig::new().with_delimiter('→').validate().is_err());
        assert!(CsvConfig::new().with_delimiter('\n').validate().is_err());
        assert!(CsvConfig::new().with_delimiter(';').validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_encoding() {
        let config = CsvConfig {
            target_encoding: "klingon".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CsvConfig {
            target_encoding: "latin1".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
