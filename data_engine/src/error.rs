use thiserror::Error;

use crate::column_detector::Role;

/// Input-level failures of an ingestion call.
///
/// Per-row problems never show up here; they are dropped and reported
/// through [`Rejection`](crate::row_normalizer::Rejection) instead.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The raw table had a header but no data rows.
    #[error("no rows parsed")]
    EmptyInput,

    /// One or more required roles (date/open/high/low/close) are unmapped.
    #[error("column mapping incomplete, missing: {}", format_roles(.missing))]
    MappingIncomplete { missing: Vec<Role> },

    /// The delimited-text reader failed.
    #[error("parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A JSON row dump could not be read.
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
