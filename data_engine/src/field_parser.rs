//! Cell-level parsers: locale-formatted numbers and mixed-format dates.
//!
//! Both parsers are total. A cell that cannot be read yields `None`, and a
//! returned number is always finite.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::raw_table::Cell;

/// Glyphs stripped from numeric cells before parsing.
pub const CURRENCY_GLYPHS: &[char] = &['₹', '$', '€', '£', '¥'];

/// Placeholder some exports write for "no value".
const EMPTY_PLACEHOLDER: &str = "--";

/// Unix timestamps longer than this many digits are taken as milliseconds.
const SECONDS_MAX_DIGITS: usize = 10;

/// Parse a price/volume cell.
///
/// Thousands separators, currency glyphs and whitespace are removed, the
/// `--` placeholder collapses to nothing, and the longest numeric prefix of
/// what remains is parsed (`"12.5abc"` reads as `12.5`).
pub fn normalize_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Null => None,
        Cell::Number(v) => v.is_finite().then_some(*v),
        Cell::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace() && !CURRENCY_GLYPHS.contains(c))
                .collect();
            let cleaned = cleaned.replace(EMPTY_PLACEHOLDER, "");
            parse_float_prefix(&cleaned)
        }
    }
}

/// Parse the longest leading slice of `s` that forms a decimal float.
fn parse_float_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Convert a date/time cell into epoch seconds (UTC).
///
/// Tried in order:
/// 1. all digits: a Unix timestamp, in milliseconds when `assume_millis` is
///    set or the value has more than ten digits;
/// 2. ISO-8601 / RFC 3339 / RFC 2822 text, naive times read as UTC;
/// 3. a three-part `d/m/y`, `y/m/d` (or `.`/`-` separated) date, ordered by
///    which part carries the four-digit year and day-first otherwise.
///
/// Two-digit years are not special-cased and fall through to day-first.
pub fn try_parse_date_to_sec(cell: &Cell, assume_millis: bool) -> Option<i64> {
    match cell {
        Cell::Null => None,
        Cell::Number(v) => {
            if !v.is_finite() || v.fract() != 0.0 || *v < 0.0 {
                return None;
            }
            let digits = format!("{v:.0}");
            parse_unix_digits(&digits, assume_millis)
        }
        Cell::Text(s) => parse_date_str(s.trim(), assume_millis),
    }
}

fn parse_date_str(s: &str, assume_millis: bool) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return parse_unix_digits(s, assume_millis);
    }
    if let Some(secs) = parse_iso(s) {
        return Some(secs);
    }
    parse_day_month_year(s)
}

fn parse_unix_digits(s: &str, assume_millis: bool) -> Option<i64> {
    let n: i64 = s.parse().ok()?;
    if assume_millis || s.len() > SECONDS_MAX_DIGITS {
        Some(n.div_euclid(1000))
    } else {
        Some(n)
    }
}

// `%#z` takes `+05:30`, `+0530` and `+05`.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%dT%H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
    "%Y/%m/%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

fn parse_iso(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp());
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.timestamp());
        }
    }
    // A trailing `Z` on a layout RFC 3339 rejects (no seconds) is plain UTC.
    let naive = s.strip_suffix(['Z', 'z']).unwrap_or(s);
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt.and_utc().timestamp());
        }
    }
    parse_ymd(s)
}

fn parse_ymd(s: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

fn parse_day_month_year(s: &str) -> Option<i64> {
    let normalized = s.replace(['.', '-'], "/");
    let parts: Vec<&str> = normalized.split('/').collect();
    let [p1, p2, p3] = parts.as_slice() else {
        return None;
    };

    let (year, month, day) = if p3.len() == 4 {
        (p3, p2, p1)
    } else if p1.len() == 4 {
        (p1, p2, p3)
    } else {
        (p3, p2, p1)
    };

    let rebuilt = format!("{year}-{month:0>2}-{day:0>2}");
    parse_ymd(&rebuilt)
}
