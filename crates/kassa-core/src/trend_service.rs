//! Month-over-month comparisons, moving-average predictions and advisories.

use serde::Serialize;

use kassa_domain::{History, LedgerMonth, MonthKey};

use crate::metrics_service::{BiggestExpense, MetricsService, LOW_BAND};

/// Relative change (percent) an aggregate or category must exceed to be reported.
pub const CHANGE_THRESHOLD: f64 = 10.0;
/// Savings ratio (percent) below which a low-savings warning is raised.
pub const LOW_SAVINGS_PERCENT: f64 = 5.0;
/// Savings ratio (percent) at or above which savings count as excellent.
pub const EXCELLENT_SAVINGS_PERCENT: f64 = 10.0;
/// Number of most recent months averaged for the prediction.
pub const PREDICTION_WINDOW: usize = 3;
/// Months required before any trend analysis activates.
pub const MIN_TREND_MONTHS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Positive,
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdvisoryKind {
    ExpensesIncreased { percent: f64 },
    ExpensesDecreased { percent: f64 },
    NegativePrediction { predicted_remaining: f64 },
    LowSavings { percent: f64, shortfall: f64 },
    ExcellentSavings { percent: f64 },
}

/// A non-blocking observation about the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub severity: Severity,
}

impl Advisory {
    fn new(kind: AdvisoryKind, severity: Severity) -> Self {
        Self { kind, severity }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpenseChange {
    pub previous: MonthKey,
    pub previous_expenses: f64,
    pub current_expenses: f64,
    pub change: f64,
    pub percent: f64,
}

impl ExpenseChange {
    pub fn advisory(&self) -> Option<Advisory> {
        if self.percent > CHANGE_THRESHOLD {
            Some(Advisory::new(
                AdvisoryKind::ExpensesIncreased {
                    percent: self.percent,
                },
                Severity::Warning,
            ))
        } else if self.percent < -CHANGE_THRESHOLD {
            Some(Advisory::new(
                AdvisoryKind::ExpensesDecreased {
                    percent: self.percent.abs(),
                },
                Severity::Positive,
            ))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub months_used: usize,
    pub avg_income: f64,
    pub avg_expenses: f64,
    pub predicted_remaining: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SavingsSignal {
    Low { percent: f64, shortfall: f64 },
    Excellent { percent: f64 },
    Neutral { percent: f64 },
}

impl SavingsSignal {
    pub fn advisory(&self) -> Option<Advisory> {
        match *self {
            SavingsSignal::Low { percent, shortfall } => Some(Advisory::new(
                AdvisoryKind::LowSavings { percent, shortfall },
                Severity::Warning,
            )),
            SavingsSignal::Excellent { percent } => Some(Advisory::new(
                AdvisoryKind::ExcellentSavings { percent },
                Severity::Positive,
            )),
            SavingsSignal::Neutral { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsightKind {
    /// Present in both months; percent is rounded to a whole number.
    Changed { percent: i64 },
    /// Absent from the first month.
    New,
    /// Absent from the last month.
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryInsight {
    pub category: String,
    pub first_amount: f64,
    pub last_amount: f64,
    pub change: f64,
    pub kind: InsightKind,
}

impl CategoryInsight {
    pub fn is_increase(&self) -> bool {
        self.change > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Comparison {
    Increased { change: f64, percent: f64 },
    Decreased { change: f64, percent: f64 },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub key: MonthKey,
    pub total_income: f64,
    pub total_expenses: f64,
    pub remaining: f64,
    pub biggest: Option<BiggestExpense>,
    /// Against the latest stored month before `key`, if any.
    pub comparison: Option<Comparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub change: Option<ExpenseChange>,
    pub prediction: Prediction,
    pub savings: SavingsSignal,
    pub advisories: Vec<Advisory>,
}

pub struct TrendService;

/// Whole-number rounding with halves going toward positive infinity
/// (`-10.5` becomes `-10`).
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

impl TrendService {
    /// Compares `current` with the latest stored month strictly before it.
    pub fn expense_change(history: &History, current: &LedgerMonth) -> Option<ExpenseChange> {
        let previous = history.previous_before(&current.key)?;
        let previous_expenses = previous.total_expenses();
        let current_expenses = current.total_expenses();
        let change = current_expenses - previous_expenses;
        let percent = if previous_expenses > 0.0 {
            change / previous_expenses * 100.0
        } else {
            0.0
        };
        Some(ExpenseChange {
            previous: previous.key,
            previous_expenses,
            current_expenses,
            change,
            percent,
        })
    }

    /// Averages the most recent months; `None` with fewer than two stored months.
    pub fn predict(history: &History) -> Option<Prediction> {
        if history.len() < MIN_TREND_MONTHS {
            return None;
        }
        let recent = history.recent(PREDICTION_WINDOW);
        let count = recent.len() as f64;
        let avg_income = recent.iter().map(|m| m.total_income()).sum::<f64>() / count;
        let avg_expenses = recent.iter().map(|m| m.total_expenses()).sum::<f64>() / count;
        Some(Prediction {
            months_used: recent.len(),
            avg_income,
            avg_expenses,
            predicted_remaining: avg_income - avg_expenses,
        })
    }

    pub fn savings_signal(total_income: f64, total_expenses: f64) -> SavingsSignal {
        let remaining = total_income - total_expenses;
        let percent = if total_income > 0.0 {
            remaining / total_income * 100.0
        } else {
            0.0
        };
        if total_income > 0.0 && percent < LOW_SAVINGS_PERCENT {
            SavingsSignal::Low {
                percent,
                shortfall: total_income * LOW_BAND - remaining,
            }
        } else if percent >= EXCELLENT_SAVINGS_PERCENT {
            SavingsSignal::Excellent { percent }
        } else {
            SavingsSignal::Neutral { percent }
        }
    }

    /// Category changes between `first` and `last`, by exact name. Only
    /// changes whose rounded percent exceeds the threshold are reported.
    pub fn category_insights(first: &LedgerMonth, last: &LedgerMonth) -> Vec<CategoryInsight> {
        let mut categories: Vec<&str> = Vec::new();
        for entry in first.expenses.iter().chain(last.expenses.iter()) {
            if !categories.contains(&entry.name.as_str()) {
                categories.push(&entry.name);
            }
        }
        let amount_in = |month: &LedgerMonth, name: &str| {
            month
                .expenses
                .iter()
                .find(|entry| entry.name == name)
                .map(|entry| entry.amount)
                .unwrap_or(0.0)
        };

        categories
            .into_iter()
            .filter_map(|category| {
                let first_amount = amount_in(first, category);
                let last_amount = amount_in(last, category);
                if first_amount == 0.0 && last_amount == 0.0 {
                    return None;
                }
                let change = last_amount - first_amount;
                let kind = if first_amount == 0.0 {
                    InsightKind::New
                } else if last_amount == 0.0 {
                    InsightKind::Removed
                } else {
                    let percent = round_half_up(change / first_amount * 100.0);
                    if (percent.abs() as f64) <= CHANGE_THRESHOLD {
                        return None;
                    }
                    InsightKind::Changed { percent }
                };
                Some(CategoryInsight {
                    category: category.to_string(),
                    first_amount,
                    last_amount,
                    change,
                    kind,
                })
            })
            .collect()
    }

    pub fn monthly_summary(history: &History, month: &LedgerMonth) -> MonthlySummary {
        let total_income = month.total_income();
        let total_expenses = month.total_expenses();
        let comparison = Self::expense_change(history, month).map(|delta| {
            if delta.change > 0.0 {
                Comparison::Increased {
                    change: delta.change,
                    percent: delta.percent,
                }
            } else if delta.change < 0.0 {
                Comparison::Decreased {
                    change: delta.change.abs(),
                    percent: delta.percent.abs(),
                }
            } else {
                Comparison::Unchanged
            }
        });
        MonthlySummary {
            key: month.key,
            total_income,
            total_expenses,
            remaining: total_income - total_expenses,
            biggest: MetricsService::biggest_expense(&month.expenses),
            comparison,
        }
    }

    /// Full trend report for `current`; requires at least two stored months.
    pub fn analyze(history: &History, current: &LedgerMonth) -> Option<TrendReport> {
        let prediction = Self::predict(history)?;
        let change = Self::expense_change(history, current);
        let savings = Self::savings_signal(current.total_income(), current.total_expenses());

        let mut advisories = Vec::new();
        if let Some(advisory) = change.as_ref().and_then(ExpenseChange::advisory) {
            advisories.push(advisory);
        }
        if prediction.predicted_remaining < 0.0 {
            advisories.push(Advisory::new(
                AdvisoryKind::NegativePrediction {
                    predicted_remaining: prediction.predicted_remaining,
                },
                Severity::Critical,
            ));
        }
        if let Some(advisory) = savings.advisory() {
            advisories.push(advisory);
        }
        tracing::debug!(month = %current.key, advisories = advisories.len(), "analyzed trends");

        Some(TrendReport {
            change,
            prediction,
            savings,
            advisories,
        })
    }
}
