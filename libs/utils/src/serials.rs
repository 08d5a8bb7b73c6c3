//! Device serial number normalization.
//!
//! Serials are the join key between MyGeotab devices and Data Connector
//! rows, so both sides run through the same rules: trim, reject anything
//! outside `[A-Za-z0-9-]`, drop the unassigned placeholder, dedupe and sort.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Serial reported by MyGeotab for devices without hardware attached.
pub const PLACEHOLDER_SERIAL: &str = "000-000-0000";

static SERIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9-]+$").unwrap());

pub fn is_valid_serial(serial: &str) -> bool {
    serial != PLACEHOLDER_SERIAL && SERIAL.is_match(serial)
}

/// Trims a single serial and returns it only if it is usable as a join key.
pub fn normalize_serial(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    is_valid_serial(trimmed).then(|| trimmed.to_string())
}

/// Normalized, deduplicated and sorted set of serials.
pub fn serial_set<I, S>(raw: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|s| normalize_serial(s.as_ref()))
        .collect()
}

/// Same as [`serial_set`] but as a sorted `Vec`.
pub fn normalize_serials<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    serial_set(raw).into_iter().collect()
}
