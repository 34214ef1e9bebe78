//! Recurrence evaluation for subscriptions.
//!
//! Two granularities are offered and they intentionally disagree for monthly
//! subscriptions:
//!
//! - [`occurs_on_day`] is day-exact: a monthly subscription occurs only on
//!   its start day-of-month.
//! - [`occurs_active_in_month`] is a month-overlap test: a monthly
//!   subscription counts for every month its date range touches.
//!
//! Dates are parsed up front into a [`Schedule`]; a malformed `startDate` or
//! `endDate` is reported as [`CalenderError::InvalidDate`] instead of
//! quietly making the subscription inactive.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};

use crate::error::{CalenderError, Result};
use crate::models::{Frequency, Subscription};

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// The parsed recurrence of a single subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub start: NaiveDate,
    /// Last day the subscription runs; `None` when ongoing.
    pub end: Option<NaiveDate>,
    pub frequency: Frequency,
}

impl Schedule {
    /// Parse the schedule of `subscription`.
    ///
    /// `endDate` is ignored entirely (not even parsed) when the subscription
    /// is ongoing.
    pub fn of(subscription: &Subscription) -> Result<Self> {
        let start = parse_date("startDate", &subscription.start_date)?;
        let end = subscription
            .effective_end_date()
            .map(|text| parse_date("endDate", text))
            .transpose()?;
        Ok(Self {
            start,
            end,
            frequency: subscription.frequency.clone(),
        })
    }

    /// Whether an occurrence falls exactly on `day`.
    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        if day < self.start {
            return false;
        }
        if let Some(end) = self.end {
            if day > end {
                return false;
            }
        }

        match self.frequency {
            Frequency::Monthly => day.day() == self.start.day(),
            Frequency::Yearly => day.day() == self.start.day() && day.month() == self.start.month(),
            Frequency::OneTime | Frequency::Unrecognized(_) => day == self.start,
        }
    }

    /// Whether the subscription counts towards the month containing
    /// `month_date`.
    pub fn active_in_month(&self, month_date: NaiveDate) -> bool {
        let (month_start, month_end) = month_bounds(month_date);

        if self.start > month_end {
            return false;
        }
        if let Some(end) = self.end {
            if end < month_start {
                return false;
            }
        }

        match self.frequency {
            Frequency::Monthly => true,
            // Compares against the month's last day rather than testing a
            // real anniversary date.
            Frequency::Yearly => {
                self.start.day() <= month_end.day() && self.start.month() == month_date.month()
            }
            Frequency::OneTime => self.start >= month_start && self.start <= month_end,
            Frequency::Unrecognized(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Whether `subscription` has an occurrence exactly on `day`.
pub fn occurs_on_day(subscription: &Subscription, day: NaiveDate) -> Result<bool> {
    Ok(Schedule::of(subscription)?.occurs_on(day))
}

/// Whether `subscription` is active in the month containing `month_date`.
pub fn occurs_active_in_month(subscription: &Subscription, month_date: NaiveDate) -> Result<bool> {
    Ok(Schedule::of(subscription)?.active_in_month(month_date))
}

// ---------------------------------------------------------------------------
// Date helpers
// ---------------------------------------------------------------------------

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    (first, last)
}

/// Parse a calendar date as the API sends it.
///
/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` timestamp, or an
/// RFC 3339 timestamp. For timestamps the date as written is used, without
/// any time zone conversion.
pub fn parse_date(field: &'static str, text: &str) -> Result<NaiveDate> {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(stamp.date_naive());
    }
    if let Ok(stamp) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(stamp.date());
    }
    Err(CalenderError::InvalidDate {
        field,
        value: text.to_string(),
    })
}
