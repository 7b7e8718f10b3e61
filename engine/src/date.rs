//! Date normalization and date filtering.
//!
//! Record date fields arrive as strings in whatever shape the backend emits.
//! Everything is normalized to a calendar day before comparison; time of day
//! never participates. A value that cannot be normalized excludes its record
//! from any active date filter.

use crate::FieldValue;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Which kind of date constraint is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFilterMode {
    /// No date constraint.
    All,
    /// Exact calendar-day match.
    Single,
    /// Inclusive range, either bound optional.
    Range,
}

/// Quick presets computed from "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuickDateFilter {
    Today,
    Yesterday,
    /// Sunday through Saturday of the week containing today.
    ThisWeek,
    ThisMonth,
    LastMonth,
}

/// The active date constraint on a table.
///
/// `single` is meaningful only in [`DateFilterMode::Single`]; `start`/`end`
/// only in [`DateFilterMode::Range`]. A `None` range bound leaves that side
/// open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFilter {
    pub mode: DateFilterMode,
    pub single: Option<NaiveDate>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateFilter {
    /// No constraint.
    pub fn all() -> Self {
        Self {
            mode: DateFilterMode::All,
            single: None,
            start: None,
            end: None,
        }
    }

    /// Exact-day constraint.
    pub fn single(day: NaiveDate) -> Self {
        Self {
            mode: DateFilterMode::Single,
            single: Some(day),
            start: None,
            end: None,
        }
    }

    /// Inclusive range constraint; either bound may be open.
    pub fn range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            mode: DateFilterMode::Range,
            single: None,
            start,
            end,
        }
    }

    /// Compute a preset constraint relative to `today`.
    pub fn quick(kind: QuickDateFilter, today: NaiveDate) -> Self {
        match kind {
            QuickDateFilter::Today => Self::single(today),
            QuickDateFilter::Yesterday => Self::single(today - Duration::days(1)),
            QuickDateFilter::ThisWeek => {
                let sunday =
                    today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
                Self::range(Some(sunday), Some(sunday + Duration::days(6)))
            }
            QuickDateFilter::ThisMonth => {
                Self::range(Some(month_start(today)), Some(month_end(today)))
            }
            QuickDateFilter::LastMonth => {
                let prev = month_start(today) - Duration::days(1);
                Self::range(Some(month_start(prev)), Some(prev))
            }
        }
    }

    /// Check a record's date field against this constraint.
    ///
    /// Missing or unparseable values never match while a mode is active.
    pub fn matches(&self, value: &FieldValue<'_>) -> bool {
        if self.mode == DateFilterMode::All {
            return true;
        }
        let Some(day) = normalize_day(&value.to_text()) else {
            return false;
        };
        match self.mode {
            DateFilterMode::All => true,
            DateFilterMode::Single => self.single.is_some_and(|s| s == day),
            DateFilterMode::Range => {
                self.start.map_or(true, |s| day >= s) && self.end.map_or(true, |e| day <= e)
            }
        }
    }
}

impl Default for DateFilter {
    fn default() -> Self {
        Self::all()
    }
}

fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn month_end(day: NaiveDate) -> NaiveDate {
    let next = if day.month() == 12 {
        NaiveDate::from_ymd_opt(day.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(day.year(), day.month() + 1, 1)
    };
    next.map_or(day, |n| n - Duration::days(1))
}

/// Date-only formats accepted before falling back to datetime parsing.
const DAY_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Datetime formats seen in backend payloads that lack a zone offset.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Normalize a raw string to a calendar day.
///
/// Accepts ISO dates, `DD/MM/YYYY`, `DD-MM-YYYY`, RFC 3339 timestamps, and
/// the common offset-less datetime shapes. Returns `None` for anything else,
/// including the empty string.
pub fn normalize_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DAY_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(day);
        }
    }
    if let Ok(stamp) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(stamp.date());
        }
    }
    None
}
