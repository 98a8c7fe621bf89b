use std::path::Path;

use serde::Deserialize;

use crate::column_detector::ColumnMapping;
use crate::error::IngestError;

pub const DEFAULT_SMA_PERIOD: usize = 20;
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Ingestion settings, usually read from a TOML file.
///
/// ```toml
/// assume_millis = false
/// sma_period = 20
/// delimiter = ";"
///
/// [mapping]
/// close = "Adj Close"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Treat every all-digit timestamp as milliseconds.
    pub assume_millis: bool,
    pub sma_period: usize,
    pub preview_rows: usize,
    /// Field delimiter; sniffed from the header when unset.
    pub delimiter: Option<char>,
    /// Manual column assignments laid over the detected mapping.
    pub mapping: Option<ColumnMapping>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            assume_millis: false,
            sma_period: DEFAULT_SMA_PERIOD,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            delimiter: None,
            mapping: None,
        }
    }
}

impl IngestConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, IngestError> {
        let config: IngestConfig = toml::from_str(s).map_err(|e| IngestError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, IngestError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<(), IngestError> {
        if self.sma_period == 0 {
            return Err(IngestError::Config("sma_period must be at least 1".to_string()));
        }
        if let Some(d) = self.delimiter {
            if !d.is_ascii() {
                return Err(IngestError::Config(format!("delimiter {d:?} is not a single-byte character")));
            }
        }
        Ok(())
    }

    /// Delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Option<u8> {
        self.delimiter.filter(char::is_ascii).map(|c| c as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let c = IngestConfig::from_toml_str("").unwrap();
        assert_eq!(c, IngestConfig::default());
        assert_eq!(c.sma_period, 20);
        assert_eq!(c.delimiter_byte(), None);
    }

    #[test]
    fn reads_all_fields() {
        let c = IngestConfig::from_toml_str(
            r#"
            assume_millis = true
            sma_period = 5
            preview_rows = 3
            delimiter = ";"

            [mapping]
            close = "Adj Close"
            "#,
        )
        .unwrap();
        assert!(c.assume_millis);
        assert_eq!(c.sma_period, 5);
        assert_eq!(c.preview_rows, 3);
        assert_eq!(c.delimiter_byte(), Some(b';'));
        let m = c.mapping.unwrap();
        assert_eq!(m.close, "Adj Close");
        assert_eq!(m.date, "");
    }

    #[test]
    fn rejects_zero_period_and_unknown_keys() {
        assert!(matches!(IngestConfig::from_toml_str("sma_period = 0"), Err(IngestError::Config(_))));
        assert!(matches!(IngestConfig::from_toml_str("colour = 1"), Err(IngestError::Config(_))));
    }

    #[test]
    fn rejects_multibyte_delimiter() {
        assert!(IngestConfig::from_toml_str("delimiter = \"₹\"").is_err());
    }
}
