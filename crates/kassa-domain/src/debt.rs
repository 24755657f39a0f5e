//! Debt records and payoff strategy enums.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Amounted, NamedEntity};

/// An outstanding debt tracked outside the monthly ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Debt {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    /// Outstanding balance in the base currency.
    pub amount: f64,
    /// Annual interest rate in percent.
    pub rate: f64,
    #[serde(alias = "minPayment")]
    pub min_payment: f64,
}

impl Debt {
    pub fn new(name: impl Into<String>, amount: f64, rate: f64, min_payment: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount,
            rate,
            min_payment,
        }
    }

    pub fn monthly_rate(&self) -> f64 {
        self.rate / 100.0 / 12.0
    }
}

impl NamedEntity for Debt {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Amounted for Debt {
    fn amount(&self) -> f64 {
        self.amount
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Order in which debts are worked through.
pub enum PayoffOrdering {
    /// Smallest balance first.
    Snowball,
    /// Highest interest rate first.
    Avalanche,
}

impl fmt::Display for PayoffOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PayoffOrdering::Snowball => "Snowball",
            PayoffOrdering::Avalanche => "Avalanche",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
/// How monthly payments are allocated during a payoff simulation.
pub enum PaymentStrategy {
    /// Every open debt receives exactly its minimum payment; freed payments
    /// are not reallocated.
    #[default]
    MinimumOnly,
    /// The sum of all minimum payments is paid every month; whatever is left
    /// after minimums goes to the first open debt in the ordering.
    Rollover,
}

impl fmt::Display for PaymentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStrategy::MinimumOnly => "minimum-only",
            PaymentStrategy::Rollover => "rollover",
        };
        f.write_str(label)
    }
}

impl FromStr for PaymentStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "minimum-only" | "minimum" | "legacy" => Ok(PaymentStrategy::MinimumOnly),
            "rollover" => Ok(PaymentStrategy::Rollover),
            other => Err(format!(
                "unknown payment strategy `{other}` (use minimum-only or rollover)"
            )),
        }
    }
}
