//! Parsing of hand-entered "Start date" values.
//!
//! The row processor only sees the [`DateTimeParser`] trait, so the accepted
//! grammar can be tightened or swapped without touching the copy loop.

use crate::error::DateParseError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Turn a human-entered date/time into wall-clock values.
pub trait DateTimeParser {
    fn parse(&self, input: &str) -> Result<NaiveDateTime, DateParseError>;
}

impl<F> DateTimeParser for F
where
    F: Fn(&str) -> Result<NaiveDateTime, DateParseError>,
{
    fn parse(&self, input: &str) -> Result<NaiveDateTime, DateParseError> {
        self(input)
    }
}

/// Best-effort parser covering the formats recorder software and
/// spreadsheets usually emit. Offsets are dropped, never converted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissiveParser;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static ORDINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap());
static AT_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+at\s+").unwrap());
static WEEKDAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").unwrap());
static ZONE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s*(z|utc|gmt)$").unwrap());

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S%.f",
    "%Y.%m.%d %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
    // month-first first, day-first only if that reading is impossible
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %I:%M:%S %p",
    "%d/%m/%Y %I:%M %p",
    "%m-%d-%Y %H:%M:%S%.f",
    "%m-%d-%Y %H:%M",
    "%d-%m-%Y %H:%M:%S%.f",
    "%d-%m-%Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%d %B %Y %I:%M:%S %p",
    "%d %B %Y %I:%M %p",
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%B %d %Y %I:%M:%S %p",
    "%B %d %Y %I:%M %p",
    "%Y%m%d_%H%M%S",
    "%Y%m%dT%H%M%S",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d %B %Y",
    "%B %d %Y",
    "%Y%m%d",
];

impl PermissiveParser {
    fn normalize(input: &str) -> String {
        let s = WEEKDAY.replace(input, "");
        let s = AT_WORD.replace_all(&s, " ");
        let s = ORDINAL.replace_all(&s, "$1");
        let s = s.replace(',', " ");
        let s = WHITESPACE.replace_all(s.trim(), " ");
        ZONE_SUFFIX.replace(&s, "").into_owned()
    }
}

impl DateTimeParser for PermissiveParser {
    fn parse(&self, input: &str) -> Result<NaiveDateTime, DateParseError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(DateParseError::Empty);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.naive_local());
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Ok(dt.naive_local());
        }
        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
                return Ok(dt.naive_local());
            }
        }

        let cleaned = Self::normalize(raw);
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
                return Ok(dt);
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(&cleaned, fmt) {
                if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                    return Ok(dt);
                }
            }
        }

        Err(DateParseError::Unrecognised(raw.to_string()))
    }
}

/// `YYYYMMDD_HHMMSS`, 24-hour, zero padded.
pub fn format_timestamp(dt: &NaiveDateTime) -> String {
    dt.format("%Y%m%d_%H%M%S").to_string()
}
