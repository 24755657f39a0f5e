//! Conversion of base-currency figures into display values and chart series.

use serde::Serialize;

use kassa_domain::{CurrencyCode, History, LedgerMonth, MonthKey, RateTable};

use crate::metrics_service::{GoalProgress, MonthMetrics};

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts base amounts for one display currency.
#[derive(Debug, Clone)]
pub struct DisplayConverter<'a> {
    pub currency: &'a CurrencyCode,
    pub rates: &'a RateTable,
}

impl<'a> DisplayConverter<'a> {
    pub fn new(currency: &'a CurrencyCode, rates: &'a RateTable) -> Self {
        Self { currency, rates }
    }

    pub fn to_display(&self, base_amount: f64) -> f64 {
        round2(self.rates.from_base(base_amount, self.currency))
    }

    /// Display-currency amount back into the base currency, unrounded.
    pub fn to_base(&self, display_amount: f64) -> f64 {
        self.rates.to_base(display_amount, self.currency)
    }

    pub fn symbol(&self) -> String {
        self.currency.symbol()
    }

    pub fn metrics(&self, metrics: &MonthMetrics) -> DisplayMetrics {
        DisplayMetrics {
            currency: self.currency.clone(),
            total_income: self.to_display(metrics.total_income),
            total_expenses: self.to_display(metrics.total_expenses),
            remaining: self.to_display(metrics.remaining),
            save_low: self.to_display(metrics.bands.low),
            save_high: self.to_display(metrics.bands.high),
            remaining_after_low: self.to_display(metrics.bands.remaining_after_low),
            remaining_after_high: self.to_display(metrics.bands.remaining_after_high),
            goal: metrics.goal.map(|goal| self.goal(&goal)),
        }
    }

    fn goal(&self, goal: &GoalProgress) -> DisplayGoal {
        DisplayGoal {
            goal: self.to_display(goal.goal),
            actual: self.to_display(goal.actual),
            shortfall: self.to_display(goal.shortfall),
            percent: round2(goal.percent),
            met: goal.met,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayGoal {
    pub goal: f64,
    pub actual: f64,
    pub shortfall: f64,
    pub percent: f64,
    pub met: bool,
}

/// [`MonthMetrics`] expressed in a display currency, rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayMetrics {
    pub currency: CurrencyCode,
    pub total_income: f64,
    pub total_expenses: f64,
    pub remaining: f64,
    pub save_low: f64,
    pub save_high: f64,
    pub remaining_after_low: f64,
    pub remaining_after_high: f64,
    pub goal: Option<DisplayGoal>,
}

/// Pie chart data: one slice per expense.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn expenses(month: &LedgerMonth, converter: &DisplayConverter<'_>) -> Self {
        let mut series = Self::default();
        for entry in &month.expenses {
            series.labels.push(entry.name.clone());
            series.values.push(converter.to_display(entry.amount));
        }
        series
    }

    /// Expense slices followed by the two savings-band slices.
    pub fn with_savings(
        month: &LedgerMonth,
        metrics: &MonthMetrics,
        converter: &DisplayConverter<'_>,
    ) -> Self {
        let mut series = Self::expenses(month, converter);
        let low = converter.to_display(metrics.bands.low);
        let high = converter.to_display(metrics.bands.high);
        series.labels.push(format!("Save 5% ({low})"));
        series.values.push(low);
        series.labels.push(format!("Save 10% ({high})"));
        series.values.push(high);
        series
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarDataset {
    pub label: MonthKey,
    pub values: Vec<f64>,
}

/// Grouped bars: expense categories on the x axis, one dataset per month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BarSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<BarDataset>,
}

impl BarSeries {
    /// Categories are the union of expense names across `months`, in first-seen
    /// order. A category missing from a month plots as 0. Unknown months are skipped.
    pub fn for_months(history: &History, months: &[MonthKey], converter: &DisplayConverter<'_>) -> Self {
        let selected: Vec<&LedgerMonth> = months.iter().filter_map(|key| history.get(key)).collect();
        let mut labels: Vec<String> = Vec::new();
        for month in &selected {
            for entry in &month.expenses {
                if !labels.contains(&entry.name) {
                    labels.push(entry.name.clone());
                }
            }
        }
        let datasets = selected
            .iter()
            .map(|month| BarDataset {
                label: month.key,
                values: labels
                    .iter()
                    .map(|label| {
                        month
                            .expenses
                            .iter()
                            .find(|entry| &entry.name == label)
                            .map(|entry| converter.to_display(entry.amount))
                            .unwrap_or(0.0)
                    })
                    .collect(),
            })
            .collect();
        Self { labels, datasets }
    }
}
