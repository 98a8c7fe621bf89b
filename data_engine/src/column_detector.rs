//! Guessing which input column plays which OHLCV role.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic role of an input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Date,
        Role::Open,
        Role::High,
        Role::Low,
        Role::Close,
        Role::Volume,
    ];

    /// Roles that must be mapped before rows can be normalized.
    pub const REQUIRED: [Role; 5] = [Role::Date, Role::Open, Role::High, Role::Low, Role::Close];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Date => "date",
            Role::Open => "open",
            Role::High => "high",
            Role::Low => "low",
            Role::Close => "close",
            Role::Volume => "volume",
        }
    }

    /// Lowercase substrings that mark a column name as carrying this role.
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            Role::Date => &["timestamp", "date", "time"],
            Role::Open => &["open", "o"],
            Role::High => &["high", "h"],
            Role::Low => &["low", "l"],
            Role::Close => &["close", "c", "last"],
            Role::Volume => &["volume", "vol", "v"],
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column name assigned to each role. An empty string means unmapped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl ColumnMapping {
    pub fn get(&self, role: Role) -> &str {
        match role {
            Role::Date => &self.date,
            Role::Open => &self.open,
            Role::High => &self.high,
            Role::Low => &self.low,
            Role::Close => &self.close,
            Role::Volume => &self.volume,
        }
    }

    pub fn set(&mut self, role: Role, column: impl Into<String>) {
        let slot = match role {
            Role::Date => &mut self.date,
            Role::Open => &mut self.open,
            Role::High => &mut self.high,
            Role::Low => &mut self.low,
            Role::Close => &mut self.close,
            Role::Volume => &mut self.volume,
        };
        *slot = column.into();
    }

    /// Column for `role`, or `None` when unmapped.
    pub fn column(&self, role: Role) -> Option<&str> {
        Some(self.get(role)).filter(|c| !c.is_empty())
    }

    /// Required roles that are still unmapped, in role order.
    pub fn missing_required(&self) -> Vec<Role> {
        Role::REQUIRED
            .into_iter()
            .filter(|r| self.column(*r).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Overlay every mapped role of `other` onto this mapping.
    pub fn merge(&mut self, other: &ColumnMapping) {
        for role in Role::ALL {
            if let Some(col) = other.column(role) {
                self.set(role, col);
            }
        }
    }
}

/// Propose a mapping from header names.
///
/// Each role independently takes the first column, in input order, whose
/// lowercased name contains any of the role's candidate substrings. One
/// column may end up serving several roles.
pub fn auto_detect<S: AsRef<str>>(columns: &[S]) -> ColumnMapping {
    let lowered: Vec<String> = columns.iter().map(|c| c.as_ref().to_lowercase()).collect();

    let mut mapping = ColumnMapping::default();
    for role in Role::ALL {
        let found = lowered
            .iter()
            .position(|name| role.candidates().iter().any(|cand| name.contains(cand)));
        if let Some(idx) = found {
            mapping.set(role, columns[idx].as_ref());
        }
    }
    mapping
}
