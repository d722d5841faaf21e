// src/core/format.rs

use crate::constants::{EMPTY_PLACEHOLDER, NULL_PLACEHOLDER};
use serde_json::Value;
use std::panic::Location;

const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Converts a byte count into the largest unit that keeps the value at or
/// above one, with two decimals (e.g. `1536` -> `"1.50 KB"`).
///
/// `0` has no logarithm, so it is clamped to the smallest unit: `"0.00 B"`.
pub fn humanize(bytes: u64) -> String {
    if bytes == 0 {
        return format!("{:.2} {}", 0.0, SIZE_UNITS[0]);
    }
    // floor(log1024(bytes)), computed exactly on integers. A u64 tops out in EB.
    let index = bytes.ilog2() / 10;
    let value = bytes as f64 / (1u64 << (index * 10)) as f64;
    let unit = SIZE_UNITS.get(index as usize).copied().unwrap_or("B");
    format!("{:.2} {}", value, unit)
}

/// Like [`humanize`], for deltas that may be negative.
pub fn humanize_signed(bytes: i64) -> String {
    if bytes < 0 {
        format!("-{}", humanize(bytes.unsigned_abs()))
    } else {
        humanize(bytes.unsigned_abs())
    }
}

/// The source location a dump or log call was made from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl CallSite {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }
}

impl From<&Location<'_>> for CallSite {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

/// Renders `< L:<line>  F:<file> >`, or an empty string if either half is missing.
pub fn call_site_marker(site: &CallSite) -> String {
    match (&site.file, site.line) {
        (Some(file), Some(line)) => format!("< L:{}  F:{} >", line, file),
        _ => String::new(),
    }
}

/// Values that are written as the empty placeholder rather than verbatim.
fn is_empty_scalar(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        _ => false,
    }
}

/// Turns an arbitrary value into the text of one log entry.
///
/// Composite values are pretty-printed, `null` and empty scalars get a
/// placeholder, everything else uses its natural string form.
pub fn format_log_message(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => pretty(value),
        Value::Null => NULL_PLACEHOLDER.to_string(),
        v if is_empty_scalar(v) => EMPTY_PLACEHOLDER.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders a value as a structured, human-readable dump.
pub fn format_dump(value: &Value) -> String {
    pretty(value)
}

fn pretty(value: &Value) -> String {
    // Serializing a `Value` to a string cannot fail.
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
