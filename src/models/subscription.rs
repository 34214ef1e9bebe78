use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CalenderError, Result};
use crate::recurrence::parse_date;

// ---------------------------------------------------------------------------
// Frequency — Recurrence kind
// ---------------------------------------------------------------------------

/// How often a subscription repeats.
///
/// Missing, `null` and empty values decode as [`Frequency::Monthly`]. Any
/// other unknown string is kept in [`Frequency::Unrecognized`] so it can be
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Frequency {
    OneTime,
    #[default]
    Monthly,
    Yearly,
    Unrecognized(String),
}

impl Frequency {
    pub fn as_str(&self) -> &str {
        match self {
            Frequency::OneTime => "one-time",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
            Frequency::Unrecognized(other) => other,
        }
    }
}

impl From<&str> for Frequency {
    fn from(value: &str) -> Self {
        match value.trim() {
            "" | "monthly" => Frequency::Monthly,
            "yearly" => Frequency::Yearly,
            "one-time" => Frequency::OneTime,
            other => Frequency::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Frequency::from).unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Investment,
    Entertainment,
    Rent,
    Software,
    Other,
    /// A category name outside the known set, kept verbatim.
    Custom(String),
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Investment,
        Category::Entertainment,
        Category::Rent,
        Category::Software,
        Category::Other,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Investment => "Investment",
            Category::Entertainment => "Entertainment",
            Category::Rent => "Rent",
            Category::Software => "Software",
            Category::Other => "Other",
            Category::Custom(name) => name,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Investment" => Category::Investment,
            "Entertainment" => Category::Entertainment,
            "Rent" => Category::Rent,
            "Software" => Category::Software,
            "Other" => Category::Other,
            _ => Category::Custom(value),
        }
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    Usd,
    Inr,
    Eur,
    Other,
    /// A currency code outside the known set, kept verbatim.
    Custom(String),
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Inr, Currency::Eur, Currency::Other];

    pub fn as_str(&self) -> &str {
        match self {
            Currency::Usd => "USD",
            Currency::Inr => "INR",
            Currency::Eur => "EUR",
            Currency::Other => "Other",
            Currency::Custom(code) => code,
        }
    }
}

impl From<String> for Currency {
    fn from(value: String) -> Self {
        match value.as_str() {
            "USD" => Currency::Usd,
            "INR" => Currency::Inr,
            "EUR" => Currency::Eur,
            "Other" => Currency::Other,
            _ => Currency::Custom(value),
        }
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Subscription — A stored subscription as returned by the API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub category: Option<Category>,
    #[serde(default, with = "amount")]
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "non_empty")]
    pub currency: Option<Currency>,
    pub start_date: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub ongoing: bool,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Subscription {
    /// End date that applies to recurrence checks: `None` while ongoing,
    /// whatever is stored otherwise.
    pub fn effective_end_date(&self) -> Option<&str> {
        if self.ongoing {
            None
        } else {
            self.end_date.as_deref()
        }
    }

    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }

    /// Check the fields a save would send and clear the end date of an
    /// ongoing subscription.
    pub fn prepare_for_save(&mut self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(CalenderError::InvalidArgument(
                "subscription id is required for an update".into(),
            ));
        }
        if self.ongoing {
            self.end_date = None;
        }
        validate_fields(&self.name, self.amount, &self.start_date, self.end_date.as_deref())
    }
}

// ---------------------------------------------------------------------------
// SubscriptionDraft — Creation payload (the server assigns the id)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDraft {
    pub name: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub category: Option<Category>,
    #[serde(default, with = "amount")]
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "non_empty")]
    pub currency: Option<Currency>,
    pub start_date: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub ongoing: bool,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SubscriptionDraft {
    /// A monthly, ongoing draft starting on `start_date`.
    pub fn new(name: impl Into<String>, start_date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_date: start_date.into(),
            ongoing: true,
            ..Default::default()
        }
    }

    pub fn prepare_for_save(&mut self) -> Result<()> {
        if self.ongoing {
            self.end_date = None;
        }
        validate_fields(&self.name, self.amount, &self.start_date, self.end_date.as_deref())
    }
}

fn validate_fields(
    name: &str,
    amount: Option<Decimal>,
    start_date: &str,
    end_date: Option<&str>,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CalenderError::InvalidArgument(
            "subscription name must not be empty".into(),
        ));
    }
    if let Some(amount) = amount {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CalenderError::InvalidArgument(format!(
                "subscription amount must not be negative, got {amount}"
            )));
        }
    }
    let start = parse_date("startDate", start_date)?;
    if let Some(end_text) = end_date {
        let end = parse_date("endDate", end_text)?;
        if end < start {
            return Err(CalenderError::InvalidArgument(format!(
                "endDate {end} is before startDate {start}"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Decode an optional string field, treating `null` and `""` as absent.
fn non_empty<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(T::from))
}

fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Amounts arrive as JSON numbers or, straight from a form, as numeric
/// strings. They go back out as numbers.
mod amount {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde::ser::Error as _;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(serde_json::Number),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = match Option::<RawAmount>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(RawAmount::Number(n)) => n.to_string(),
            Some(RawAmount::Text(s)) => s,
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid amount {text:?}: {e}")))
    }

    pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            None => serializer.serialize_none(),
            Some(amount) => {
                let number = serde_json::Number::from_str(&amount.normalize().to_string())
                    .map_err(S::Error::custom)?;
                serializer.serialize_some(&number)
            }
        }
    }
}
