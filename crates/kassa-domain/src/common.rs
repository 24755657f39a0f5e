//! Shared traits and enums for budgeting primitives.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Currency every ledger amount is stored in.
pub const BASE_CURRENCY: &str = "SEK";

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a common contract for retrieving numeric amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn base() -> Self {
        Self::new(BASE_CURRENCY)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_base(&self) -> bool {
        self.0 == BASE_CURRENCY
    }

    pub fn symbol(&self) -> String {
        symbol_for(self.as_str())
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::base()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "SEK" => "kr".into(),
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        _ => code.into(),
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
/// Cadence a raw amount was entered at.
pub enum Frequency {
    Weekly,
    BiWeekly,
    #[default]
    Monthly,
    Yearly,
}

impl Frequency {
    /// Linear factor turning one period's amount into a monthly amount.
    pub fn monthly_factor(self) -> f64 {
        match self {
            Frequency::Weekly => 52.0 / 12.0,
            Frequency::BiWeekly => 26.0 / 12.0,
            Frequency::Monthly => 1.0,
            Frequency::Yearly => 1.0 / 12.0,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Frequency::Weekly => "weekly",
            Frequency::BiWeekly => "bi-weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseFrequencyError;

impl fmt::Display for ParseFrequencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("frequency must be weekly, bi-weekly, monthly or yearly")
    }
}

impl std::error::Error for ParseFrequencyError {}

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" | "week" => Ok(Frequency::Weekly),
            "bi-weekly" | "biweekly" | "fortnightly" => Ok(Frequency::BiWeekly),
            "monthly" | "month" => Ok(Frequency::Monthly),
            "yearly" | "annual" | "year" => Ok(Frequency::Yearly),
            _ => Err(ParseFrequencyError),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Distinguishes the two entry lists of a month.
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    /// Name used when the user leaves the name field blank.
    pub fn default_name(self) -> &'static str {
        match self {
            EntryKind::Income => "Income",
            EntryKind::Expense => "Expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        };
        f.write_str(label)
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "incomes" => Ok(EntryKind::Income),
            "expense" | "expenses" => Ok(EntryKind::Expense),
            other => Err(format!("unknown entry kind `{other}`")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_codes_are_uppercased() {
        assert_eq!(CurrencyCode::new(" usd ").as_str(), "USD");
        assert!(CurrencyCode::new("sek").is_base());
    }

    #[test]
    fn frequency_parses_aliases_and_serializes_kebab_case() {
        assert_eq!("Bi-Weekly".parse::<Frequency>(), Ok(Frequency::BiWeekly));
        assert_eq!("annual".parse::<Frequency>(), Ok(Frequency::Yearly));
        assert!("daily".parse::<Frequency>().is_err());
        let json = serde_json::to_string(&Frequency::BiWeekly).unwrap();
        assert_eq!(json, "\"bi-weekly\"");
    }
}
