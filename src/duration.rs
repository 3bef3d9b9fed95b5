//! Placement durations and date formats
//!
//! Durations use calendar rollover: whole years, then whole months, then the
//! leftover days expressed as weeks plus days. Adding months to a date clamps
//! to the last day of the target month, so 31 January plus one month is
//! 29 February in a leap year.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::DataFormatError;

/// Display format used on contracts and in merge data
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

const REGISTRY_DATE_FORMAT: &str = "%Y-%m-%d";
const ZERO_DURATION: &str = "0 days";

/// Calendar difference between two dates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarSpan {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl CalendarSpan {
    /// Difference from `start` to `end`; `None` when `end` is before `start`
    pub fn between(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if end < start {
            return None;
        }

        let mut total_months =
            (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;

        let mut anchor = add_months(start, total_months)?;
        if anchor > end {
            total_months -= 1;
            anchor = add_months(start, total_months)?;
        }

        let days = (end - anchor).num_days();
        let total_months = u32::try_from(total_months).ok()?;

        Some(Self {
            years: total_months / 12,
            months: total_months % 12,
            days: u32::try_from(days).ok()?,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }
}

fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let months = u32::try_from(months).ok()?;
    date.checked_add_months(Months::new(months))
}

fn plural(count: u32, unit: &str) -> String {
    if count > 1 {
        format!("{} {}s", count, unit)
    } else {
        format!("{} {}", count, unit)
    }
}

/// Human-readable duration, e.g. `"1 year, 2 months, 3 weeks, 4 days"`
///
/// Returns `"0 days"` when either date is absent, when the difference is zero
/// in every component, or when `end` precedes `start`.
pub fn compute_duration(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    let (Some(start), Some(end)) = (start, end) else {
        return ZERO_DURATION.to_string();
    };

    let Some(span) = CalendarSpan::between(start, end) else {
        return ZERO_DURATION.to_string();
    };

    if span.is_zero() {
        return ZERO_DURATION.to_string();
    }

    let mut parts = Vec::new();
    if span.years > 0 {
        parts.push(plural(span.years, "year"));
    }
    if span.months > 0 {
        parts.push(plural(span.months, "month"));
    }

    let weeks = span.days / 7;
    let days = span.days % 7;
    if weeks > 0 {
        parts.push(plural(weeks, "week"));
    }
    if days > 0 {
        parts.push(plural(days, "day"));
    }

    parts.join(", ")
}

/// Parse a placement-registry date
///
/// The registry sends `YYYY-MM-DD`, usually followed by a time part
/// (`"2025-03-01 00:00:00.000"` or `"2025-03-01T00:00:00"`); only the date is
/// kept.
pub fn parse_registry_date(field: &str, value: &str) -> Result<NaiveDate, DataFormatError> {
    let trimmed = value.trim();
    let date_part = trimmed
        .split(|c: char| c == 'T' || c == ' ')
        .next()
        .unwrap_or_default();

    NaiveDate::parse_from_str(date_part, REGISTRY_DATE_FORMAT)
        .map_err(|_| DataFormatError::new(field, value, "YYYY-MM-DD[ time]"))
}

/// Parse a `DD/MM/YYYY` date
pub fn parse_display_date(field: &str, value: &str) -> Result<NaiveDate, DataFormatError> {
    NaiveDate::parse_from_str(value.trim(), DISPLAY_DATE_FORMAT)
        .map_err(|_| DataFormatError::new(field, value, "DD/MM/YYYY"))
}

/// Format an optional date as `DD/MM/YYYY`, empty when absent
pub fn format_display_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Duration between two `DD/MM/YYYY` strings as stored on a contract
///
/// Blank inputs count as absent. Text that is present but unparseable is an
/// error rather than a silently wrong duration.
pub fn duration_between_display_dates(start: &str, end: &str) -> Result<String, DataFormatError> {
    let start = match start.trim() {
        "" => None,
        value => Some(parse_display_date("startdate", value)?),
    };
    let end = match end.trim() {
        "" => None,
        value => Some(parse_display_date("enddate", value)?),
    };

    Ok(compute_duration(start, end))
}
