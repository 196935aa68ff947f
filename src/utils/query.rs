use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::error::QueryError;
use crate::models::{GradeRecord, Verdict};

/// Lowest grade that still counts as a pass.
pub const PASS_THRESHOLD: i64 = 6;

const ITALIAN_MONTHS: [&str; 12] = [
    "gennaio",
    "febbraio",
    "marzo",
    "aprile",
    "maggio",
    "giugno",
    "luglio",
    "agosto",
    "settembre",
    "ottobre",
    "novembre",
    "dicembre",
];

// Naive timestamps as MySQL rows and browsers tend to serialise them.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Keeps the records whose student name contains `query`, ignoring case.
///
/// A blank query (empty or only whitespace) filters nothing and hands back every record in its
/// original order. Matching lowercases both sides, so the comparison is consistent for any
/// Unicode name.
pub fn filter_by_name<'a>(records: &'a [GradeRecord], query: &str) -> Vec<&'a GradeRecord> {
    if query.trim().is_empty() {
        return records.iter().collect();
    }

    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| record.student_name.to_lowercase().contains(&needle))
        .collect()
}

// Pass or fail against the fixed threshold, for any integer.
pub fn classify(grade: i64) -> Verdict {
    if grade < PASS_THRESHOLD {
        Verdict::Fail
    } else {
        Verdict::Pass
    }
}

/// Renders a date the way an Italian reader expects it, e.g. `2024-03-05` becomes `5 marzo 2024`.
///
/// Plain dates, RFC 3339 and naive timestamps, and RFC 2822 (what the Flask backend emits for
/// `DATE` columns) are accepted. For timestamps carrying an offset the calendar day in that
/// offset is used.
pub fn format_display_date(iso_date: &str) -> Result<String, QueryError> {
    let date = parse_calendar_date(iso_date.trim())
        .ok_or_else(|| QueryError::InvalidDateFormat(iso_date.to_string()))?;

    Ok(format!(
        "{} {} {}",
        date.day(),
        ITALIAN_MONTHS[date.month0() as usize],
        date.year()
    ))
}

// Calendar day of any accepted date shape; the input must already be trimmed.
pub(crate) fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    if let Some(stamp) = NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(stamp.date());
    }
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|stamp| stamp.date_naive())
}
