use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{CalenderError, Result};

// ---------------------------------------------------------------------------
// Totals — Summed amounts per bucket, in first-seen order
// ---------------------------------------------------------------------------

/// Amounts summed per bucket (currency or category).
///
/// Buckets keep the order in which they were first seen so a UI can list
/// them stably. Equality compares order too; compare via [`Totals::get`] or
/// a sorted copy when order does not matter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    entries: Vec<(String, Decimal)>,
}

impl Totals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `bucket`, creating it at the end if new.
    ///
    /// Fails with [`CalenderError::InvalidArgument`] if the bucket total
    /// would overflow.
    pub fn add(&mut self, bucket: &str, amount: Decimal) -> Result<()> {
        match self.entries.iter_mut().find(|(name, _)| name == bucket) {
            Some((_, total)) => *total = checked_sum(*total, amount)?,
            None => self.entries.push((bucket.to_string(), amount)),
        }
        Ok(())
    }

    pub fn get(&self, bucket: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|(name, _)| name == bucket)
            .map(|(_, total)| *total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.entries.iter().map(|(name, total)| (name.as_str(), *total))
    }

    pub fn buckets(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum over all buckets.
    pub fn grand_total(&self) -> Result<Decimal> {
        self.entries
            .iter()
            .try_fold(Decimal::ZERO, |acc, (_, total)| checked_sum(acc, *total))
    }

    pub fn into_vec(self) -> Vec<(String, Decimal)> {
        self.entries
    }
}

impl Serialize for Totals {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, total) in &self.entries {
            map.serialize_entry(name, total)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// MonthlyTotal — One point of the yearly series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    /// Short month name, e.g. `"Jan"`.
    pub label: String,
    /// First day of the month.
    pub month: NaiveDate,
    pub total: Decimal,
}

/// `a + b`, or an error instead of the overflow panic.
pub fn checked_sum(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| CalenderError::InvalidArgument(format!("amount total overflows: {a} + {b}")))
}
