use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use csv::StringRecord;

use crate::error::{Result, StatsError};

/// One parsed row of the archive.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub timestamp: DateTime<Tz>,
    pub source: String,
    pub text: String,
}

/// Column positions of the fields the engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub id: usize,
    pub timestamp: usize,
    pub source: usize,
    pub text: usize,
}

impl Default for ColumnMap {
    // tweet_id, in_reply_to_status_id, in_reply_to_user_id, timestamp, source, text, ...
    fn default() -> Self {
        Self { id: 0, timestamp: 3, source: 4, text: 5 }
    }
}

impl ColumnMap {
    /// Resolve columns by header name, keeping the fixed position for any
    /// name the header lacks.
    pub fn from_headers(headers: &StringRecord) -> Self {
        let mut map = Self::default();
        let find = |names: &[&str]| {
            headers.iter().position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        if let Some(i) = find(&["tweet_id", "id"]) { map.id = i; }
        if let Some(i) = find(&["timestamp", "created_at"]) { map.timestamp = i; }
        if let Some(i) = find(&["source"]) { map.source = i; }
        if let Some(i) = find(&["text"]) { map.text = i; }
        map
    }
}

/// Validate a raw row. `Ok(None)` means the row is too short and is skipped;
/// a bad timestamp on a full row is an error.
pub fn parse_row(
    row: &StringRecord,
    cols: &ColumnMap,
    row_number: u64,
    min_columns: usize,
    tz: &Tz,
) -> Result<Option<Record>> {
    if row.len() < min_columns {
        return Ok(None);
    }
    let field = |i: usize| row.get(i).unwrap_or("").to_string();
    let raw_ts = field(cols.timestamp);
    let timestamp = parse_timestamp(&raw_ts)
        .ok_or_else(|| StatsError::Timestamp { row: row_number, value: raw_ts.clone() })?
        .with_timezone(tz);
    Ok(Some(Record {
        id: field(cols.id),
        timestamp,
        source: field(cols.source),
        text: field(cols.text),
    }))
}

/// Parse the timestamp forms found in archive exports. Values without an
/// offset are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    let offset_fmts = [
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S%z",
        "%Y-%m-%d %H:%M:%S%.f %z",
        "%a %b %d %H:%M:%S %z %Y",
    ];
    for f in offset_fmts.iter() {
        if let Ok(dt) = DateTime::parse_from_str(s, f) {
            return Some(dt);
        }
    }
    let naive_fmts = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ];
    for f in naive_fmts.iter() {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(Utc.from_utc_datetime(&ndt).fixed_offset());
        }
    }
    None
}
