//! Calendar-month identifiers used as ledger keys.

use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Identifies one calendar month. Ordering is chronological and the canonical
/// text form (`YYYY-MM`) sorts the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthKeyError> {
        if !(1..=12).contains(&month) {
            return Err(MonthKeyError::MonthOutOfRange(month));
        }
        if !(1..=9999).contains(&year) {
            return Err(MonthKeyError::YearOutOfRange(year));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors that can occur when constructing [`MonthKey`] values.
pub enum MonthKeyError {
    Malformed(String),
    MonthOutOfRange(u32),
    YearOutOfRange(i32),
}

impl fmt::Display for MonthKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthKeyError::Malformed(raw) => {
                write!(f, "month key `{raw}` must look like YYYY-MM")
            }
            MonthKeyError::MonthOutOfRange(month) => {
                write!(f, "month {month} is outside 1-12")
            }
            MonthKeyError::YearOutOfRange(year) => write!(f, "year {year} is out of range"),
        }
    }
}

impl std::error::Error for MonthKeyError {}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    /// Accepts the canonical `YYYY-MM` form and the legacy unpadded `YYYY-M`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let malformed = || MonthKeyError::Malformed(trimmed.to_string());
        let (year, month) = trimmed.split_once('-').ok_or_else(malformed)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(malformed());
        }
        if !year.chars().all(|c| c.is_ascii_digit()) || !month.chars().all(|c| c.is_ascii_digit())
        {
            return Err(malformed());
        }
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let month: u32 = month.parse().map_err(|_| malformed())?;
        Self::new(year, month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_is_zero_padded() {
        let key = MonthKey::new(2024, 3).unwrap();
        assert_eq!(key.to_string(), "2024-03");
    }

    #[test]
    fn legacy_keys_parse_and_sort_chronologically() {
        let march: MonthKey = "2024-3".parse().unwrap();
        let november: MonthKey = "2024-11".parse().unwrap();
        assert!(march < november);
        assert!(march.to_string() < november.to_string());
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!("2024".parse::<MonthKey>().is_err());
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("24-01".parse::<MonthKey>().is_err());
        assert!("2024-001".parse::<MonthKey>().is_err());
    }

    #[test]
    fn previous_and_next_wrap_years() {
        let january = MonthKey::new(2025, 1).unwrap();
        assert_eq!(january.previous(), MonthKey::new(2024, 12).unwrap());
        assert_eq!(january.previous().next(), january);
    }

    #[test]
    fn serializes_as_string() {
        let key = MonthKey::new(2023, 9).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2023-09\"");
        let parsed: MonthKey = serde_json::from_str("\"2023-9\"").unwrap();
        assert_eq!(parsed, key);
    }
}
