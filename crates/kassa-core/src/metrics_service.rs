//! Per-month totals, savings bands, goal progress and the biggest expense.

use serde::Serialize;

use kassa_domain::{Entry, LedgerMonth, SavingsGoal};

/// Share of income suggested as the lower savings band.
pub const LOW_BAND: f64 = 0.05;
/// Share of income suggested as the upper savings band.
pub const HIGH_BAND: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SavingsBands {
    pub low: f64,
    pub high: f64,
    pub remaining_after_low: f64,
    pub remaining_after_high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal: f64,
    pub actual: f64,
    pub percent: f64,
    pub met: bool,
    pub shortfall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiggestExpense {
    pub index: usize,
    pub name: String,
    pub amount: f64,
}

/// Base-currency figures derived from one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthMetrics {
    pub total_income: f64,
    pub total_expenses: f64,
    pub remaining: f64,
    pub bands: SavingsBands,
    pub goal: Option<GoalProgress>,
    pub biggest_expense: Option<BiggestExpense>,
}

pub struct MetricsService;

impl MetricsService {
    pub fn compute(month: &LedgerMonth, goal: Option<SavingsGoal>) -> MonthMetrics {
        let total_income = month.total_income();
        let total_expenses = month.total_expenses();
        let remaining = total_income - total_expenses;
        tracing::debug!(month = %month.key, total_income, total_expenses, "computed month metrics");
        MonthMetrics {
            total_income,
            total_expenses,
            remaining,
            bands: Self::savings_bands(total_income, remaining),
            goal: goal.map(|goal| Self::goal_progress(remaining, goal.amount())),
            biggest_expense: Self::biggest_expense(&month.expenses),
        }
    }

    /// 5 % and 10 % of income; both zero unless income is positive.
    pub fn savings_bands(total_income: f64, remaining: f64) -> SavingsBands {
        let (low, high) = if total_income > 0.0 {
            (total_income * LOW_BAND, total_income * HIGH_BAND)
        } else {
            (0.0, 0.0)
        };
        SavingsBands {
            low,
            high,
            remaining_after_low: remaining - low,
            remaining_after_high: remaining - high,
        }
    }

    pub fn goal_progress(remaining: f64, goal: f64) -> GoalProgress {
        let actual = remaining.max(0.0);
        let percent = if goal > 0.0 {
            (actual / goal * 100.0).min(100.0)
        } else {
            0.0
        };
        GoalProgress {
            goal,
            actual,
            percent,
            met: actual >= goal,
            shortfall: (goal - actual).max(0.0),
        }
    }

    /// Largest expense; ties resolve to the earliest entry.
    pub fn biggest_expense(expenses: &[Entry]) -> Option<BiggestExpense> {
        let mut biggest: Option<(usize, &Entry)> = None;
        for (index, entry) in expenses.iter().enumerate() {
            match biggest {
                Some((_, current)) if entry.amount <= current.amount => {}
                _ => biggest = Some((index, entry)),
            }
        }
        biggest.map(|(index, entry)| BiggestExpense {
            index,
            name: entry.name.clone(),
            amount: entry.amount,
        })
    }
}
