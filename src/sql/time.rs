//! Relative and custom time ranges resolved to inclusive calendar dates.
//!
//! Resolution depends only on the range and a reference date, never on the
//! wall clock, so compiled SQL is reproducible. Periods are whole calendar
//! periods: `current_month` on 2024-05-15 is the full month of May, including
//! days after the reference date. Weeks run Monday to Sunday.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::intent::{TimeRange, TimeRangeType};

/// Inclusive date bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeRangeError {
    #[error("custom time range requires start_date and end_date")]
    MissingCustomDates,

    #[error("time range start {start} is after end {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },

    #[error("time range '{kind}' is out of the supported calendar range for reference date {reference}")]
    OutOfRange {
        kind: TimeRangeType,
        reference: NaiveDate,
    },
}

/// Resolve `range` against `reference`.
pub fn resolve_range(range: &TimeRange, reference: NaiveDate) -> Result<DateRange, TimeRangeError> {
    if range.kind == TimeRangeType::Custom {
        let (Some(start), Some(end)) = (range.start_date, range.end_date) else {
            return Err(TimeRangeError::MissingCustomDates);
        };
        if start > end {
            return Err(TimeRangeError::StartAfterEnd { start, end });
        }
        return Ok(DateRange::new(start, end));
    }

    relative(range.kind, reference).ok_or(TimeRangeError::OutOfRange {
        kind: range.kind,
        reference,
    })
}

fn relative(kind: TimeRangeType, reference: NaiveDate) -> Option<DateRange> {
    match kind {
        TimeRangeType::CurrentMonth => month_of(reference),
        TimeRangeType::LastMonth => month_of(reference.checked_sub_months(Months::new(1))?),
        TimeRangeType::CurrentQuarter => quarter_of(reference),
        TimeRangeType::LastQuarter => quarter_of(reference.checked_sub_months(Months::new(3))?),
        TimeRangeType::CurrentYear => year_of(reference.year()),
        TimeRangeType::LastYear => year_of(reference.year() - 1),
        TimeRangeType::CurrentWeek => week_of(reference),
        TimeRangeType::LastWeek => week_of(reference.checked_sub_days(Days::new(7))?),
        TimeRangeType::Custom => None,
    }
}

fn month_span(year: i32, month: u32, months: u32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = start
        .checked_add_months(Months::new(months))?
        .checked_sub_days(Days::new(1))?;
    Some(DateRange::new(start, end))
}

fn month_of(date: NaiveDate) -> Option<DateRange> {
    month_span(date.year(), date.month(), 1)
}

fn quarter_of(date: NaiveDate) -> Option<DateRange> {
    let first_month = (date.month0() / 3) * 3 + 1;
    month_span(date.year(), first_month, 3)
}

fn year_of(year: i32) -> Option<DateRange> {
    month_span(year, 1, 12)
}

fn week_of(date: NaiveDate) -> Option<DateRange> {
    let monday = date.checked_sub_days(Days::new(u64::from(
        date.weekday().num_days_from_monday(),
    )))?;
    let sunday = monday.checked_add_days(Days::new(6))?;
    Some(DateRange::new(monday, sunday))
}
