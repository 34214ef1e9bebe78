//! Amount summaries built on the month-overlap recurrence test.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use crate::config::{UNCATEGORIZED, UNKNOWN_CURRENCY};
use crate::error::Result;
use crate::models::{checked_sum, MonthlyTotal, Subscription, Totals};
use crate::recurrence::Schedule;

/// Sum amounts of the subscriptions active in `month_date`'s month, per
/// currency. Subscriptions without a currency land in `"Unknown"`.
pub fn totals_by_currency(subscriptions: &[Subscription], month_date: NaiveDate) -> Result<Totals> {
    totals_by(subscriptions, month_date, |sub| {
        sub.currency.as_ref().map(|c| c.as_str()).unwrap_or(UNKNOWN_CURRENCY)
    })
}

/// Sum amounts of the subscriptions active in `month_date`'s month, per
/// category. Subscriptions without a category land in `"Uncategorized"`.
pub fn totals_by_category(subscriptions: &[Subscription], month_date: NaiveDate) -> Result<Totals> {
    totals_by(subscriptions, month_date, |sub| {
        sub.category.as_ref().map(|c| c.as_str()).unwrap_or(UNCATEGORIZED)
    })
}

fn totals_by<F>(subscriptions: &[Subscription], month_date: NaiveDate, bucket: F) -> Result<Totals>
where
    F: Fn(&Subscription) -> &str,
{
    let mut totals = Totals::new();
    for sub in subscriptions {
        if Schedule::of(sub)?.active_in_month(month_date) {
            totals.add(bucket(sub), sub.amount_or_zero())?;
        }
    }
    Ok(totals)
}

/// Twelve monthly totals, January to December of `year_anchor`'s year.
///
/// Amounts are summed across currencies, so the series is only meaningful
/// for a single-currency list. A monthly total that overflows is an error.
pub fn yearly_series(subscriptions: &[Subscription], year_anchor: NaiveDate) -> Result<Vec<MonthlyTotal>> {
    let schedules = subscriptions
        .iter()
        .map(|sub| Schedule::of(sub).map(|schedule| (schedule, sub.amount_or_zero())))
        .collect::<Result<Vec<_>>>()?;

    let january = NaiveDate::from_ymd_opt(year_anchor.year(), 1, 1).unwrap_or(year_anchor);
    (0..12)
        .filter_map(|offset| january.checked_add_months(Months::new(offset)))
        .map(|month| -> Result<MonthlyTotal> {
            let total = schedules
                .iter()
                .filter(|(schedule, _)| schedule.active_in_month(month))
                .try_fold(Decimal::ZERO, |acc, (_, amount)| checked_sum(acc, *amount))?;
            Ok(MonthlyTotal {
                label: month.format("%b").to_string(),
                month,
                total,
            })
        })
        .collect()
}
