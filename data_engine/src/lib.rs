pub mod column_detector;
pub mod config;
mod data_engine;
pub mod error;
pub mod field_parser;
pub mod raw_table;
pub mod row_normalizer;
pub mod series;

pub use crate::column_detector::{auto_detect, ColumnMapping, Role};
pub use crate::config::IngestConfig;
pub use crate::data_engine::{write_csv, CsvRecord, DataEngine, Ingestion};
pub use crate::error::IngestError;
pub use crate::field_parser::{normalize_number, try_parse_date_to_sec};
pub use crate::raw_table::{Cell, RawRow, RawTable};
pub use crate::row_normalizer::{normalize, Normalized, RejectReason, Rejection};
pub use crate::series::{assemble, Bar, Series};
