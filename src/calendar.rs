//! Month view data: the grid of days a calendar UI renders, with the
//! subscriptions that fall on each day.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::error::Result;
use crate::models::Subscription;
use crate::recurrence::{month_bounds, Schedule};

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

// ---------------------------------------------------------------------------
// CalendarDay
// ---------------------------------------------------------------------------

/// One cell of the month grid.
#[derive(Debug, Clone)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    /// False for the leading/trailing days borrowed from adjacent months.
    pub in_current_month: bool,
    /// Subscriptions with an occurrence on `date`, in input order.
    pub subscriptions: Vec<&'a Subscription>,
}

impl CalendarDay<'_> {
    pub fn has_subscriptions(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Names of the day's subscriptions, comma separated.
    pub fn tooltip(&self) -> String {
        self.subscriptions
            .iter()
            .map(|sub| sub.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// ---------------------------------------------------------------------------
// MonthGrid
// ---------------------------------------------------------------------------

/// Sunday-first weeks covering a whole month.
#[derive(Debug, Clone)]
pub struct MonthGrid<'a> {
    /// First day of the displayed month.
    pub month: NaiveDate,
    pub weeks: Vec<[CalendarDay<'a>; 7]>,
}

impl<'a> MonthGrid<'a> {
    /// Lay out the month containing `month_date`, from the Sunday on or
    /// before its first day to the Saturday on or after its last day.
    pub fn build(subscriptions: &'a [Subscription], month_date: NaiveDate) -> Result<Self> {
        let schedules = subscriptions
            .iter()
            .map(|sub| Schedule::of(sub).map(|schedule| (schedule, sub)))
            .collect::<Result<Vec<_>>>()?;

        let (month_start, month_end) = month_bounds(month_date);
        let grid_start = week_start(month_start);
        let grid_end = week_start(month_end) + Days::new(6);

        let mut weeks = Vec::new();
        let mut day = grid_start;
        while day <= grid_end {
            let week: [CalendarDay<'a>; 7] = std::array::from_fn(|offset| {
                let date = day + Days::new(offset as u64);
                CalendarDay {
                    date,
                    in_current_month: date.month() == month_start.month()
                        && date.year() == month_start.year(),
                    subscriptions: schedules
                        .iter()
                        .filter(|(schedule, _)| schedule.occurs_on(date))
                        .map(|(_, sub)| *sub)
                        .collect(),
                }
            });
            weeks.push(week);
            day = day + Days::new(7);
        }

        Ok(Self {
            month: month_start,
            weeks,
        })
    }

    pub fn days(&self) -> impl Iterator<Item = &CalendarDay<'a>> {
        self.weeks.iter().flat_map(|week| week.iter())
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay<'a>> {
        self.days().find(|cell| cell.date == date)
    }

    /// Title for the grid header, e.g. `"March 2024"`.
    pub fn title(&self) -> String {
        month_title(self.month)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Subscriptions with an occurrence on `day`, in input order.
pub fn subscriptions_on(subscriptions: &[Subscription], day: NaiveDate) -> Result<Vec<&Subscription>> {
    let mut found = Vec::new();
    for sub in subscriptions {
        if Schedule::of(sub)?.occurs_on(day) {
            found.push(sub);
        }
    }
    Ok(found)
}

/// First day of the month after `date`'s month.
pub fn next_month(date: NaiveDate) -> NaiveDate {
    let (first, _) = month_bounds(date);
    first.checked_add_months(Months::new(1)).unwrap_or(first)
}

/// First day of the month before `date`'s month.
pub fn previous_month(date: NaiveDate) -> NaiveDate {
    let (first, _) = month_bounds(date);
    first.checked_sub_months(Months::new(1)).unwrap_or(first)
}

pub fn month_title(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Sun).first_day()
}
