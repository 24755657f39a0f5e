//! Exchange-rate table expressed as units of a currency per one base unit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::CurrencyCode;

/// Currencies the rate service is queried for, besides the base.
pub const QUOTED_CURRENCIES: [&str; 4] = ["USD", "EUR", "JPY", "GBP"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Live,
    #[default]
    Fallback,
}

/// Rates keyed by currency; `rates[USD] = 0.094` means 1 SEK = 0.094 USD.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateTable {
    pub base: CurrencyCode,
    pub rates: BTreeMap<CurrencyCode, f64>,
    #[serde(default)]
    pub source: RateSource,
}

impl RateTable {
    pub fn new(base: CurrencyCode, source: RateSource) -> Self {
        Self {
            base,
            rates: BTreeMap::new(),
            source,
        }
    }

    /// Static table used whenever the live fetch fails.
    pub fn fallback() -> Self {
        Self::new(CurrencyCode::base(), RateSource::Fallback)
            .with_rate("USD", 0.094)
            .with_rate("EUR", 0.088)
            .with_rate("JPY", 14.5)
            .with_rate("GBP", 0.076)
    }

    pub fn with_rate(mut self, code: &str, rate: f64) -> Self {
        self.rates.insert(CurrencyCode::new(code), rate);
        self
    }

    /// Usable rate for `currency`; `None` when missing, zero or not finite.
    pub fn rate(&self, currency: &CurrencyCode) -> Option<f64> {
        self.rates
            .get(currency)
            .copied()
            .filter(|rate| rate.is_finite() && rate.abs() >= f64::EPSILON)
    }

    /// Converts an amount in `currency` into the base currency. Without a
    /// usable rate the amount is treated as already being in the base.
    pub fn to_base(&self, amount: f64, currency: &CurrencyCode) -> f64 {
        if *currency == self.base {
            return amount;
        }
        match self.rate(currency) {
            Some(rate) => amount / rate,
            None => amount,
        }
    }

    /// Converts a base-currency amount into `currency`, identity without a rate.
    pub fn from_base(&self, amount: f64, currency: &CurrencyCode) -> f64 {
        if *currency == self.base {
            return amount;
        }
        match self.rate(currency) {
            Some(rate) => amount * rate,
            None => amount,
        }
    }

    /// Base currency followed by every currency with a usable rate.
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        let mut codes = vec![self.base.clone()];
        codes.extend(
            self.rates
                .keys()
                .filter(|code| self.rate(code).is_some())
                .cloned(),
        );
        codes
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::fallback()
    }
}
