use std::path::Path;

use csv::WriterBuilder;
use tracing::{info, warn};

use crate::column_detector::{auto_detect, ColumnMapping};
use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::raw_table::RawTable;
use crate::row_normalizer::{normalize, Rejection};
use crate::series::{assemble, Bar, Series};

pub trait CsvRecord: std::fmt::Debug {
    fn headers() -> &'static [&'static str];
    fn record(&self) -> Vec<String>;
}

impl CsvRecord for Bar {
    fn headers() -> &'static [&'static str] {
        &["time", "open", "high", "low", "close", "volume"]
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.time.to_string(),
            format!("{:.6}", self.open),
            format!("{:.6}", self.high),
            format!("{:.6}", self.low),
            format!("{:.6}", self.close),
            self.volume.map(|v| format!("{:.6}", v)).unwrap_or_default(),
        ]
    }
}

/// Result of one ingestion call.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingestion {
    /// The mapping actually applied (detected, then overridden).
    pub mapping: ColumnMapping,
    pub series: Series,
    pub rejected: Vec<Rejection>,
}

impl Ingestion {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// Raw table in, chronologically ordered bars out.
#[derive(Debug, Default)]
pub struct DataEngine;

impl DataEngine {
    pub fn new() -> Self {
        DataEngine
    }

    /// Detect the mapping, let `overrides` replace any role it names, then
    /// normalize and sort.
    pub fn ingest(
        &self,
        table: &RawTable,
        overrides: Option<&ColumnMapping>,
        assume_millis: bool,
    ) -> Result<Ingestion, IngestError> {
        if table.is_empty() {
            warn!("no rows parsed");
            return Err(IngestError::EmptyInput);
        }

        let mut mapping = auto_detect(table.headers.as_slice());
        if let Some(over) = overrides {
            mapping.merge(over);
        }

        let normalized = normalize(&table.rows, &mapping, assume_millis)?;
        let series = assemble(normalized.bars);

        info!(
            rows = table.len(),
            bars = series.len(),
            rejected = normalized.rejected.len(),
            "ingested table"
        );

        Ok(Ingestion {
            mapping,
            series,
            rejected: normalized.rejected,
        })
    }

    pub fn load_csv(&self, path: &Path, config: &IngestConfig) -> Result<Ingestion, IngestError> {
        let table = RawTable::from_csv_path(path, config.delimiter_byte())?;
        info!(path = %path.display(), rows = table.len(), "read csv");
        self.ingest(&table, config.mapping.as_ref(), config.assume_millis)
    }
}

pub fn write_csv<T: CsvRecord>(records: &[T], path: &Path) -> Result<(), IngestError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;

    writer.write_record(T::headers())?;
    for record in records {
        writer.write_record(record.record())?;
    }
    writer.flush()?;
    Ok(())
}
