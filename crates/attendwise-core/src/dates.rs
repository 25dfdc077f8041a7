//! Normalisation of the free-form date text the portal hands out.
//!
//! The portal mixes `DD/MM/YYYY`, `DD-MM-YYYY` and ISO-ish strings, with and
//! without a time of day. Everything is read day-first; a missing time means
//! local midnight. Unparseable input yields `None`, never an error.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Day-first formats, tried in order before the generic fallback.
const DAY_FIRST_DATETIME: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DAY_FIRST_DATE: &[&str] = &["%d/%m/%Y", "%d-%m-%Y"];

const FALLBACK_DATETIME: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const FALLBACK_DATE: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%d %B %Y"];

/// Parse portal date text into a local wall-clock instant.
pub fn parse_instant(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    parse_with(text, DAY_FIRST_DATETIME, DAY_FIRST_DATE).or_else(|| parse_fallback(text))
}

/// Parse portal date text and keep only the calendar day.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    parse_instant(text).map(|instant| instant.date())
}

fn parse_with(text: &str, datetimes: &[&str], dates: &[&str]) -> Option<NaiveDateTime> {
    datetimes
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            dates
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

fn parse_fallback(text: &str) -> Option<NaiveDateTime> {
    // Offset-bearing timestamps are shifted into local wall-clock time.
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    parse_with(text, FALLBACK_DATETIME, FALLBACK_DATE)
}
