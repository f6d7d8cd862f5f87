//! Serde helpers for the calendar-date fields of trip documents.
//!
//! Documents written by other clients store dates as `YYYY-MM-DD` strings,
//! and use either `null` or an empty string for "no date".

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Deserialize an optional date, treating `null` and `""` as `None`.
pub fn optional<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    parse_optional(raw.as_deref()).map_err(serde::de::Error::custom)
}

/// Deserialize a date inside a patch.
///
/// A missing field leaves the target untouched (`None`, via `#[serde(default)]`),
/// `null` or `""` clears it (`Some(None)`), a date sets it (`Some(Some(d))`).
pub fn patch<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional(deserializer).map(Some)
}

fn parse_optional(raw: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| format!("invalid date '{}': {}", s, e)),
    }
}
