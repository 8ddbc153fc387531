//! Incremental decoding of activity log streams.
//!
//! The remote log is line-delimited JSON delivered in arbitrary chunks, so a
//! read may end in the middle of a record. Callers keep a residual buffer per
//! stream: [`take_complete`] moves everything up to the last newline out of it,
//! and [`parse_log_lines`] turns that content into [`LogItem`]s.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::trace;

use crate::types::LogItem;

#[derive(Debug, Deserialize)]
struct RawLogRecord {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    data: Option<RawLogData>,
}

#[derive(Debug, Deserialize)]
struct RawLogData {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

/// Append `incoming` to `residual` and split off the complete part.
///
/// Returns everything up to and including the last `\n`; the bytes after it
/// stay in `residual` for the next call. Returns an empty vec when no full
/// line is available yet.
pub fn take_complete(residual: &mut Vec<u8>, incoming: &[u8]) -> Vec<u8> {
    residual.extend_from_slice(incoming);
    match residual.iter().rposition(|b| *b == b'\n') {
        Some(last_newline) => {
            let tail = residual.split_off(last_newline + 1);
            std::mem::replace(residual, tail)
        }
        None => Vec::new(),
    }
}

/// Decode one JSON record per line. Lines that are blank, not valid JSON, or
/// carry no message are dropped.
pub fn parse_log_lines(content: &[u8]) -> Vec<LogItem> {
    let text = String::from_utf8_lossy(content);
    text.lines().filter_map(parse_log_line).collect()
}

/// Decode a single line, if it holds a log record.
pub fn parse_log_line(line: &str) -> Option<LogItem> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() {
        return None;
    }
    let record: RawLogRecord = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            trace!(error = %e, "dropping undecodable log line");
            return None;
        }
    };
    let (message, timestamp) = match record.data {
        Some(data) if data.message.is_some() => {
            (data.message, data.timestamp.or(record.timestamp))
        }
        _ => (record.message, record.timestamp),
    };
    Some(LogItem {
        timestamp,
        message: message?,
    })
}
