//! Raw tabular input as handed over by a delimited-text (or JSON) parser.
//!
//! Nothing here interprets values. Header names become keys, every cell is
//! kept as-is, and the field parsers decide later what a cell means.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::IngestError;

/// One raw cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Null,
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<Value> for Cell {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Cell::Null,
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
            Value::String(s) => Cell::Text(s),
            other => Cell::Text(other.to_string()),
        }
    }
}

static NULL_CELL: Cell = Cell::Null;

/// A single row keyed by column name, in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: IndexMap<String, Cell>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, cell: impl Into<Cell>) {
        self.cells.insert(column.into(), cell.into());
    }

    /// Cell under `column`, or `Null` when the row has no such column.
    pub fn get(&self, column: &str) -> &Cell {
        self.cells.get(column).unwrap_or(&NULL_CELL)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<Cell>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Header names plus the data rows beneath them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// First `n` rows, for showing the user what the mapping will see.
    pub fn preview(&self, n: usize) -> &[RawRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn from_csv_path(path: &Path, delimiter: Option<u8>) -> Result<Self, IngestError> {
        Self::from_csv_reader(File::open(path)?, delimiter)
    }

    /// Read a delimited table. Without an explicit delimiter, the header
    /// line is peeked at to choose between comma, semicolon and tab.
    pub fn from_csv_reader<R: Read>(mut reader: R, delimiter: Option<u8>) -> Result<Self, IngestError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;

        let delimiter = match delimiter {
            Some(d) => d,
            None => sniff_delimiter(&buf)?,
        };
        debug!(delimiter = %(delimiter as char).escape_default(), "reading delimited table");

        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::Headers)
            .flexible(true)
            .from_reader(buf.as_slice());

        // Fields are decoded lossily, so a stray Latin-1 byte only spoils its own cell.
        let headers: Vec<String> = rdr
            .byte_headers()?
            .iter()
            .map(|h| decode_field(h).trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in rdr.byte_records() {
            let record = result?;
            let row: RawRow = headers
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    let cell = record.get(i).map(|f| Cell::Text(decode_field(f))).unwrap_or(Cell::Null);
                    (h.clone(), cell)
                })
                .collect();
            rows.push(row);
        }

        Ok(RawTable { headers, rows })
    }

    /// Read a JSON array of objects, e.g. rows already split by an upstream
    /// parser. Headers are the keys of the first object.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, IngestError> {
        let objects: Vec<serde_json::Map<String, Value>> = serde_json::from_reader(reader)?;

        let headers: Vec<String> = objects
            .first()
            .map(|o| o.keys().map(|k| k.trim().to_string()).collect())
            .unwrap_or_default();
        let rows: Vec<RawRow> = objects
            .into_iter()
            .map(|o| {
                o.into_iter()
                    .map(|(k, v)| (k.trim().to_string(), Cell::from(v)))
                    .collect()
            })
            .collect();

        Ok(RawTable { headers, rows })
    }
}

fn sniff_delimiter(buf: &[u8]) -> Result<u8, IngestError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(buf);

    // A header that parses as one field under commas is likely using another separator.
    if let Some(record) = rdr.byte_records().next() {
        let record = record?;
        if record.len() == 1 {
            let field = &record[0];
            for candidate in [b';', b'\t'] {
                if field.contains(&candidate) {
                    return Ok(candidate);
                }
            }
        }
    }
    Ok(b',')
}

fn decode_field(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_comma_table_with_trimmed_headers() {
        let input = " Date , Open,Close\n01/01/2024,10,11\n\n02/01/2024,11,12\n";
        let table = RawTable::from_csv_reader(input.as_bytes(), None).unwrap();
        assert_eq!(table.headers, vec!["Date", "Open", "Close"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].get("Close"), &Cell::from("12"));
    }

    #[test]
    fn sniffs_semicolon_and_tab() {
        let semi = "date;close\n2024-01-01;1,5\n";
        let table = RawTable::from_csv_reader(semi.as_bytes(), None).unwrap();
        assert_eq!(table.headers, vec!["date", "close"]);
        assert_eq!(table.rows[0].get("close"), &Cell::from("1,5"));

        let tab = "date\tclose\n2024-01-01\t7\n";
        let table = RawTable::from_csv_reader(tab.as_bytes(), None).unwrap();
        assert_eq!(table.rows[0].get("close"), &Cell::from("7"));
    }

    #[test]
    fn short_rows_fill_with_null() {
        let input = "a,b,c\n1,2\n";
        let table = RawTable::from_csv_reader(input.as_bytes(), None).unwrap();
        assert!(table.rows[0].get("c").is_null());
        assert!(table.rows[0].get("missing").is_null());
    }

    #[test]
    fn header_only_is_empty() {
        let table = RawTable::from_csv_reader("a,b\n".as_bytes(), None).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn json_rows_keep_key_order_and_types() {
        let input = r#"[{"time": 1700000000, "close": "1,234.5", "volume": null}]"#;
        let table = RawTable::from_json_reader(input.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["time", "close", "volume"]);
        assert_eq!(table.rows[0].get("time"), &Cell::Number(1_700_000_000.0));
        assert!(table.rows[0].get("volume").is_null());
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let input: &[u8] = b"Date,Open,High,Low,Close,Note\n\
            01/01/2024,10,12,9,11,ok\n\
            02/01/2024,11,13,10,12,caf\xe9\n";
        let table = RawTable::from_csv_reader(input, None).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].get("Note"), &Cell::from("caf\u{FFFD}"));
        assert_eq!(table.rows[1].get("Close"), &Cell::from("12"));
    }

    #[test]
    fn invalid_utf8_header_still_sniffs_semicolon() {
        let input: &[u8] = b"Date;Cl\xf4ture\n2024-01-01;7\n";
        let table = RawTable::from_csv_reader(input, None).unwrap();
        assert_eq!(table.headers, vec!["Date".to_string(), "Cl\u{FFFD}ture".to_string()]);
        assert_eq!(table.rows[0].get("Date"), &Cell::from("2024-01-01"));
    }

    #[test]
    fn preview_is_bounded() {
        let input = "a\n1\n2\n3\n";
        let table = RawTable::from_csv_reader(input.as_bytes(), None).unwrap();
        assert_eq!(table.preview(2).len(), 2);
        assert_eq!(table.preview(10).len(), 3);
    }
}
