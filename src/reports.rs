//! Composes engine outputs into the views the shell prints. Every report is
//! rebuilt from the current store snapshot; nothing here is cached.

use tracing::debug;

use kassa_core::{
    BarSeries, BiggestExpense, CategoryInsight, ChartSeries, CoreError, DebtService,
    DisplayMetrics, LedgerStore, MetricsService, MonthlySummary, PayoffComparison, TrendReport,
    TrendService,
};
use kassa_domain::{sum_amounts, Debt, History, LedgerMonth, MonthKey};

use crate::app::AppState;

/// Everything shown after a month is calculated or selected for review.
#[derive(Debug, Clone)]
pub struct MonthReport {
    pub month: LedgerMonth,
    pub metrics: DisplayMetrics,
    pub biggest: Option<BiggestExpense>,
    pub chart: ChartSeries,
    pub summary: MonthlySummary,
    pub trend: Option<TrendReport>,
}

impl MonthReport {
    pub fn build(state: &AppState, store: &LedgerStore, key: &MonthKey) -> Result<Self, CoreError> {
        let month = store
            .get(key)
            .cloned()
            .ok_or(CoreError::MonthNotFound(*key))?;
        Ok(Self::for_month(state, store.history(), store.goal(), month))
    }

    /// Report for the latest stored month, if any.
    pub fn latest(state: &AppState, store: &LedgerStore) -> Option<Self> {
        let month = store.latest().cloned()?;
        Some(Self::for_month(state, store.history(), store.goal(), month))
    }

    fn for_month(
        state: &AppState,
        history: &History,
        goal: Option<kassa_domain::SavingsGoal>,
        month: LedgerMonth,
    ) -> Self {
        let converter = state.converter();
        let base_metrics = MetricsService::compute(&month, goal);
        let metrics = converter.metrics(&base_metrics);
        let chart = ChartSeries::with_savings(&month, &base_metrics, &converter);
        let summary = TrendService::monthly_summary(history, &month);
        let trend = TrendService::analyze(history, &month);
        debug!(month = %month.key, currency = %state.currency, "built month report");
        Self {
            biggest: base_metrics.biggest_expense,
            month,
            metrics,
            chart,
            summary,
            trend,
        }
    }
}

/// Side-by-side view of several months.
#[derive(Debug, Clone)]
pub struct TrendsView {
    pub months: Vec<MonthKey>,
    pub bars: BarSeries,
    /// Category changes between the earliest and latest selected month.
    pub insights: Vec<CategoryInsight>,
}

impl TrendsView {
    /// Fails when any selected month is not stored. Selection is deduplicated
    /// and sorted chronologically.
    pub fn build(state: &AppState, history: &History, selected: &[MonthKey]) -> Result<Self, CoreError> {
        let mut months = selected.to_vec();
        months.sort();
        months.dedup();
        if months.len() < 2 {
            return Err(CoreError::Validation(
                "select at least two distinct months to compare".into(),
            ));
        }
        for key in &months {
            if history.get(key).is_none() {
                return Err(CoreError::MonthNotFound(*key));
            }
        }

        let bars = BarSeries::for_months(history, &months, &state.converter());
        let insights = match (
            months.first().and_then(|key| history.get(key)),
            months.last().and_then(|key| history.get(key)),
        ) {
            (Some(first), Some(last)) => TrendService::category_insights(first, last),
            _ => Vec::new(),
        };
        Ok(Self {
            months,
            bars,
            insights,
        })
    }
}

/// Payoff projections for the tracked debts.
#[derive(Debug, Clone)]
pub struct DebtReport {
    pub total_balance: f64,
    pub total_min_payment: f64,
    /// `None` when no debts are tracked.
    pub comparison: Option<PayoffComparison>,
}

impl DebtReport {
    pub fn build(state: &AppState, debts: &[Debt]) -> Self {
        let total_min_payment = debts.iter().map(|debt| debt.min_payment).sum();
        let comparison = if debts.is_empty() {
            None
        } else {
            Some(DebtService::compare(debts, state.strategy))
        };
        Self {
            total_balance: sum_amounts(debts),
            total_min_payment,
            comparison,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassa_domain::{CurrencyCode, Entry, PaymentStrategy};

    fn key(raw: &str) -> MonthKey {
        raw.parse().unwrap()
    }

    fn month(raw: &str, income: f64, expenses: &[(&str, f64)]) -> LedgerMonth {
        LedgerMonth::with_entries(
            key(raw),
            vec![Entry::new("Salary", income)],
            expenses
                .iter()
                .map(|(name, amount)| Entry::new(*name, *amount))
                .collect(),
        )
    }

    fn store() -> LedgerStore {
        let mut store = LedgerStore::in_memory();
        store
            .put(month("2024-01", 30000.0, &[("Rent", 10000.0), ("Food", 5000.0)]))
            .unwrap();
        store
            .put(month("2024-02", 30000.0, &[("Rent", 10000.0), ("Food", 8000.0), ("Gym", 500.0)]))
            .unwrap();
        store
    }

    #[test]
    fn month_report_converts_to_display_currency() {
        let store = store();
        let state = AppState::default().with_currency(CurrencyCode::new("USD"));
        let report = MonthReport::build(&state, &store, &key("2024-01")).unwrap();
        assert_eq!(report.metrics.total_income, 2820.0);
        assert_eq!(report.metrics.remaining, 1410.0);
        assert_eq!(report.chart.labels.len(), 4);
        assert!(report.trend.is_some());
        assert!(report.summary.comparison.is_none());
    }

    #[test]
    fn latest_report_carries_trend_advisories() {
        let store = store();
        let report = MonthReport::latest(&AppState::default(), &store).unwrap();
        assert_eq!(report.month.key, key("2024-02"));
        let trend = report.trend.unwrap();
        let change = trend.change.unwrap();
        assert!((change.percent - 23.333333333333332).abs() < 1e-9);
        assert!(!trend.advisories.is_empty());
    }

    #[test]
    fn unknown_month_is_an_error() {
        let store = store();
        let err = MonthReport::build(&AppState::default(), &store, &key("2023-12")).unwrap_err();
        assert!(matches!(err, CoreError::MonthNotFound(_)));
    }

    #[test]
    fn trends_view_compares_first_and_last_selected() {
        let store = store();
        let view = TrendsView::build(
            &AppState::default(),
            store.history(),
            &[key("2024-02"), key("2024-01")],
        )
        .unwrap();
        assert_eq!(view.months, vec![key("2024-01"), key("2024-02")]);
        assert_eq!(view.bars.labels, vec!["Rent", "Food", "Gym"]);
        assert_eq!(view.bars.datasets[0].values, vec![10000.0, 5000.0, 0.0]);
        let names: Vec<_> = view.insights.iter().map(|i| i.category.as_str()).collect();
        assert_eq!(names, vec!["Food", "Gym"]);
    }

    #[test]
    fn trends_view_needs_two_months() {
        let store = store();
        assert!(TrendsView::build(&AppState::default(), store.history(), &[key("2024-01")]).is_err());
    }

    #[test]
    fn debt_report_uses_state_strategy() {
        let debts = vec![Debt::new("Card", 1000.0, 0.0, 1000.0)];
        let state = AppState::default().with_strategy(PaymentStrategy::Rollover);
        let report = DebtReport::build(&state, &debts);
        let comparison = report.comparison.unwrap();
        assert_eq!(comparison.strategy, PaymentStrategy::Rollover);
        assert_eq!(comparison.snowball.months, 1);
        assert_eq!(report.total_balance, 1000.0);
        assert!(DebtReport::build(&state, &[]).comparison.is_none());
    }
}
