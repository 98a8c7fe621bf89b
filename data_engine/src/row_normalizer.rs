//! Turning raw rows into validated bars.

use std::fmt;

use tracing::{debug, warn};

use crate::column_detector::{ColumnMapping, Role};
use crate::error::IngestError;
use crate::field_parser::{normalize_number, try_parse_date_to_sec};
use crate::raw_table::RawRow;
use crate::series::Bar;

/// Why a row was left out of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnparseableDate,
    NegativeTime,
    NonNumeric(Role),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnparseableDate => f.write_str("unparseable date"),
            RejectReason::NegativeTime => f.write_str("time before epoch"),
            RejectReason::NonNumeric(role) => write!(f, "non-numeric {role}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    /// Zero-based index into the raw rows.
    pub row: usize,
    pub reason: RejectReason,
}

/// Accepted bars (in input order) and the rows that were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub bars: Vec<Bar>,
    pub rejected: Vec<Rejection>,
}

/// Validate every row against `mapping`.
///
/// A row is kept only if its date parses to a non-negative time and all four
/// prices parse to finite numbers. Volume is read only when mapped; an
/// unreadable volume leaves the bar without one rather than dropping it.
pub fn normalize(
    rows: &[RawRow],
    mapping: &ColumnMapping,
    assume_millis: bool,
) -> Result<Normalized, IngestError> {
    let missing = mapping.missing_required();
    if !missing.is_empty() {
        warn!(?missing, "column mapping incomplete, nothing normalized");
        return Err(IngestError::MappingIncomplete { missing });
    }

    let mut out = Normalized::default();
    for (idx, row) in rows.iter().enumerate() {
        match normalize_row(row, mapping, assume_millis) {
            Ok(bar) => out.bars.push(bar),
            Err(reason) => {
                debug!(row = idx, %reason, "row rejected");
                out.rejected.push(Rejection { row: idx, reason });
            }
        }
    }
    Ok(out)
}

fn normalize_row(row: &RawRow, mapping: &ColumnMapping, assume_millis: bool) -> Result<Bar, RejectReason> {
    let time = try_parse_date_to_sec(row.get(&mapping.date), assume_millis)
        .ok_or(RejectReason::UnparseableDate)?;
    if time < 0 {
        return Err(RejectReason::NegativeTime);
    }

    let price = |role: Role| {
        normalize_number(row.get(mapping.get(role))).ok_or(RejectReason::NonNumeric(role))
    };
    let open = price(Role::Open)?;
    let high = price(Role::High)?;
    let low = price(Role::Low)?;
    let close = price(Role::Close)?;

    let volume = mapping
        .column(Role::Volume)
        .and_then(|col| normalize_number(row.get(col)));

    Ok(Bar { time, open, high, low, close, volume })
}
