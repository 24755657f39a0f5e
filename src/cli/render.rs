//! Text rendering of reports. Amounts arrive in the base currency unless the
//! type says otherwise and are converted here through the app state.

use kassa_core::{
    Advisory, AdvisoryKind, CategoryInsight, Comparison, InsightKind, PayoffResult, Severity,
};
use kassa_domain::{Entry, LedgerMonth};

use crate::app::AppState;
use crate::cli::output::{self, money};
use crate::reports::{DebtReport, MonthReport, TrendsView};

pub fn entries(state: &AppState, title: &str, entries: &[Entry]) {
    let converter = state.converter();
    output::info(format!("{title}:"));
    if entries.is_empty() {
        output::info("  (none)");
        return;
    }
    for (index, entry) in entries.iter().enumerate() {
        let mut line = format!(
            "  {:>2}. {:<24} {:>14}",
            index + 1,
            entry.name,
            money(converter.to_display(entry.amount), &state.currency)
        );
        if entry.recurring {
            line.push_str("  [recurring]");
        }
        if !entry.note.is_empty() {
            line.push_str(&format!("  ({})", entry.note));
        }
        output::info(line);
    }
}

pub fn month_entries(state: &AppState, month: &LedgerMonth) {
    output::section(format!("Entries for {}", month.key));
    entries(state, "Incomes", &month.incomes);
    entries(state, "Expenses", &month.expenses);
}

pub fn month_report(state: &AppState, report: &MonthReport) {
    let currency = &state.currency;
    let metrics = &report.metrics;
    let converter = state.converter();

    output::section(format!("Budget for {}", report.month.key));
    output::info(format!("  Total income    : {}", money(metrics.total_income, currency)));
    output::info(format!("  Total expenses  : {}", money(metrics.total_expenses, currency)));
    output::info(format!("  Remaining       : {}", money(metrics.remaining, currency)));
    output::info(format!(
        "  Save 5%         : {}  (leaves {})",
        money(metrics.save_low, currency),
        money(metrics.remaining_after_low, currency)
    ));
    output::info(format!(
        "  Save 10%        : {}  (leaves {})",
        money(metrics.save_high, currency),
        money(metrics.remaining_after_high, currency)
    ));

    if let Some(goal) = &metrics.goal {
        let status = if goal.met {
            "goal met".to_string()
        } else {
            format!("{} short", money(goal.shortfall, currency))
        };
        output::info(format!(
            "  Savings goal    : {} of {} ({:.0}%, {status})",
            money(goal.actual, currency),
            money(goal.goal, currency),
            goal.percent
        ));
    }

    if let Some(biggest) = &report.biggest {
        output::info(format!(
            "  Biggest expense : {} ({})",
            biggest.name,
            money(converter.to_display(biggest.amount), currency)
        ));
    }

    match report.summary.comparison {
        Some(Comparison::Increased { change, percent }) => output::info(format!(
            "  vs previous     : expenses up {} ({percent:.1}%)",
            money(converter.to_display(change), currency)
        )),
        Some(Comparison::Decreased { change, percent }) => output::info(format!(
            "  vs previous     : expenses down {} ({percent:.1}%)",
            money(converter.to_display(change), currency)
        )),
        Some(Comparison::Unchanged) => output::info("  vs previous     : expenses unchanged"),
        None => {}
    }

    if !report.chart.is_empty() {
        output::section("Expense breakdown");
        let total: f64 = report.chart.values.iter().sum();
        for (label, value) in report.chart.labels.iter().zip(&report.chart.values) {
            let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
            output::info(format!(
                "  {:<28} {:>14} {:>6.1}%",
                label,
                money(*value, currency),
                share
            ));
        }
    }

    match &report.trend {
        Some(trend) => {
            output::section("Trends");
            output::info(format!(
                "  Predicted next month ({} months): income {}, expenses {}, remaining {}",
                trend.prediction.months_used,
                money(converter.to_display(trend.prediction.avg_income), currency),
                money(converter.to_display(trend.prediction.avg_expenses), currency),
                money(converter.to_display(trend.prediction.predicted_remaining), currency)
            ));
            advisories(state, &trend.advisories);
        }
        None => output::hint("Save at least two months to see trends and predictions."),
    }
}

pub fn advisories(state: &AppState, advisories: &[Advisory]) {
    let converter = state.converter();
    let currency = &state.currency;
    for advisory in advisories {
        let text = match &advisory.kind {
            AdvisoryKind::ExpensesIncreased { percent } => {
                format!("Expenses rose {percent:.1}% compared to last month.")
            }
            AdvisoryKind::ExpensesDecreased { percent } => {
                format!("Expenses fell {percent:.1}% compared to last month.")
            }
            AdvisoryKind::NegativePrediction {
                predicted_remaining,
            } => format!(
                "At the current pace next month ends at {}.",
                money(converter.to_display(*predicted_remaining), currency)
            ),
            AdvisoryKind::LowSavings { percent, shortfall } => format!(
                "Only {percent:.1}% of income is left over; {} more reaches 5%.",
                money(converter.to_display(*shortfall), currency)
            ),
            AdvisoryKind::ExcellentSavings { percent } => {
                format!("Excellent: {percent:.1}% of income is left over.")
            }
        };
        match advisory.severity {
            Severity::Positive => output::success(text),
            Severity::Info => output::info(text),
            Severity::Warning | Severity::Critical => output::warning(text),
        }
    }
}

pub fn trends(state: &AppState, view: &TrendsView) {
    let currency = &state.currency;
    output::section("Expenses by category");
    let header: Vec<String> = view.months.iter().map(|key| format!("{key:>12}")).collect();
    output::info(format!("  {:<24}{}", "", header.join("")));
    for (row, label) in view.bars.labels.iter().enumerate() {
        let cells: Vec<String> = view
            .bars
            .datasets
            .iter()
            .map(|dataset| format!("{:>12.2}", dataset.values.get(row).copied().unwrap_or(0.0)))
            .collect();
        output::info(format!("  {:<24}{}", label, cells.join("")));
    }
    output::info(format!("  (amounts in {currency})"));

    output::section("Category insights");
    if view.insights.is_empty() {
        output::info("  No category changed by more than 10%.");
    }
    for insight in &view.insights {
        insight_line(state, insight);
    }
}

fn insight_line(state: &AppState, insight: &CategoryInsight) {
    let converter = state.converter();
    let currency = &state.currency;
    let text = match insight.kind {
        InsightKind::New => format!(
            "{}: new expense of {}",
            insight.category,
            money(converter.to_display(insight.last_amount), currency)
        ),
        InsightKind::Removed => format!(
            "{}: no longer present (was {})",
            insight.category,
            money(converter.to_display(insight.first_amount), currency)
        ),
        InsightKind::Changed { percent } => format!(
            "{}: {}{percent}% ({} -> {})",
            insight.category,
            if percent > 0 { "+" } else { "" },
            money(converter.to_display(insight.first_amount), currency),
            money(converter.to_display(insight.last_amount), currency)
        ),
    };
    if insight.is_increase() {
        output::warning(text);
    } else {
        output::success(text);
    }
}

pub fn debts(state: &AppState, report: &DebtReport, list: &[kassa_domain::Debt]) {
    let converter = state.converter();
    let currency = &state.currency;
    output::section("Debts");
    if list.is_empty() {
        output::info("  No debts tracked.");
        return;
    }
    for (index, debt) in list.iter().enumerate() {
        output::info(format!(
            "  {:>2}. {:<20} {:>14}  {:>5.2}%  min {}",
            index + 1,
            debt.name,
            money(converter.to_display(debt.amount), currency),
            debt.rate,
            money(converter.to_display(debt.min_payment), currency)
        ));
    }
    output::info(format!(
        "  Total: {} owed, {} minimum per month",
        money(converter.to_display(report.total_balance), currency),
        money(converter.to_display(report.total_min_payment), currency)
    ));
}

pub fn payoff(state: &AppState, report: &DebtReport) {
    let Some(comparison) = &report.comparison else {
        output::info("No debts to simulate.");
        return;
    };
    output::section(format!("Payoff projection ({})", comparison.strategy));
    payoff_line(state, "Snowball (smallest balance first)", &comparison.snowball);
    payoff_line(state, "Avalanche (highest rate first)", &comparison.avalanche);
}

fn payoff_line(state: &AppState, label: &str, result: &PayoffResult) {
    let interest = money(state.converter().to_display(result.total_interest), &state.currency);
    if result.capped {
        output::warning(format!(
            "  {label}: not paid off within {} months ({interest} interest so far)",
            result.months
        ));
    } else {
        output::info(format!(
            "  {label}: {} months, {interest} interest",
            result.months
        ));
    }
}
