use kassa_domain::{
    CurrencyCode, Debt, Entry, EntryKind, Frequency, History, LedgerMonth, MonthKey,
    PaymentStrategy, PayoffOrdering, RateTable, SavingsGoal, SortOrder,
};

use crate::{
    debt_service::{DebtService, MAX_SIMULATION_MONTHS},
    display::{round2, BarSeries, ChartSeries, DisplayConverter},
    draft_service::{Draft, DraftHistory, DraftService, RawEntry, MAX_HISTORY},
    ledger_service::{EntryEdit, LedgerService},
    ledger_store::LedgerStore,
    metrics_service::MetricsService,
    storage::StoreDocument,
    trend_service::{
        AdvisoryKind, Comparison, ExpenseChange, InsightKind, SavingsSignal, Severity, TrendService,
    },
    CoreError,
};

fn key(raw: &str) -> MonthKey {
    raw.parse().expect("valid month key")
}

fn month(raw: &str, incomes: &[(&str, f64)], expenses: &[(&str, f64)]) -> LedgerMonth {
    LedgerMonth::with_entries(
        key(raw),
        incomes.iter().map(|(n, a)| Entry::new(*n, *a)).collect(),
        expenses.iter().map(|(n, a)| Entry::new(*n, *a)).collect(),
    )
}

fn history_of(months: Vec<LedgerMonth>) -> History {
    let mut history = History::new();
    for month in months {
        history.put(month);
    }
    history
}

#[test]
fn duplicate_rent_entries_merge_into_one() {
    let mut entries = vec![
        Entry::new("Rent", 100.0).with_note("first half"),
        Entry::new("Groceries", 50.0),
        Entry::new("rent", 200.0).with_note("second half"),
    ];

    let groups = LedgerService::find_duplicate_groups(&entries);
    assert_eq!(groups, vec![vec![0, 2]]);

    LedgerService::merge_group(&mut entries, &groups[0]).expect("merge rent");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Rent");
    assert_eq!(entries[0].amount, 300.0);
    assert_eq!(entries[0].note, "first half; second half");
    assert_eq!(entries[1].name, "Groceries");
    assert_eq!(entries[1].amount, 50.0);
}

#[test]
fn merge_all_handles_several_groups() {
    let mut entries = vec![
        Entry::new("Food", 10.0),
        Entry::new("Gym", 5.0),
        Entry::new("FOOD", 20.0),
        Entry::new("gym", 5.0),
        Entry::new("Food", 1.0),
    ];
    let merged = LedgerService::merge_all_duplicates(&mut entries).expect("merge all");
    assert_eq!(merged, 2);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].amount, 31.0);
    assert_eq!(entries[1].amount, 10.0);
    assert!(LedgerService::find_duplicate_groups(&entries).is_empty());
}

#[test]
fn merge_rejects_out_of_range_indices() {
    let mut entries = vec![Entry::new("Rent", 100.0)];
    let err = LedgerService::merge_group(&mut entries, &[0, 4]).expect_err("bad index");
    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(entries.len(), 1);
}

#[test]
fn single_debt_without_interest_pays_off_in_one_month() {
    let debts = vec![Debt::new("Loan", 1000.0, 0.0, 1000.0)];
    for strategy in [PaymentStrategy::MinimumOnly, PaymentStrategy::Rollover] {
        let result = DebtService::simulate(&debts, PayoffOrdering::Snowball, strategy);
        assert_eq!(result.months, 1);
        assert_eq!(result.total_interest, 0.0);
        assert!(!result.capped);
    }
}

#[test]
fn divergent_debt_stops_at_month_cap() {
    let debts = vec![Debt::new("Payday", 1000.0, 100.0, 10.0)];
    let result = DebtService::simulate(&debts, PayoffOrdering::Avalanche, PaymentStrategy::MinimumOnly);
    assert_eq!(result.months, MAX_SIMULATION_MONTHS);
    assert_eq!(result.months, 600);
    assert!(result.capped);
    assert!(result.total_interest > 0.0);
}

#[test]
fn simulation_leaves_input_debts_untouched() {
    let debts = vec![
        Debt::new("Card", 500.0, 20.0, 50.0),
        Debt::new("Car", 4000.0, 5.0, 200.0),
    ];
    let before = debts.clone();
    DebtService::compare(&debts, PaymentStrategy::Rollover);
    assert_eq!(debts, before);
}

#[test]
fn rollover_reuses_freed_minimum_payments() {
    let debts = vec![
        Debt::new("Small", 1000.0, 0.0, 100.0),
        Debt::new("Large", 2000.0, 0.0, 100.0),
    ];
    let legacy = DebtService::simulate(&debts, PayoffOrdering::Snowball, PaymentStrategy::MinimumOnly);
    let rollover = DebtService::simulate(&debts, PayoffOrdering::Snowball, PaymentStrategy::Rollover);
    assert_eq!(legacy.months, 20);
    assert_eq!(rollover.months, 15);
}

#[test]
fn orderings_sort_by_balance_and_rate() {
    let debts = vec![
        Debt::new("Mid", 2000.0, 10.0, 50.0),
        Debt::new("Small", 500.0, 3.0, 25.0),
        Debt::new("Hot", 3000.0, 24.0, 90.0),
    ];
    let snowball: Vec<_> = DebtService::order(&debts, PayoffOrdering::Snowball)
        .into_iter()
        .map(|d| d.name)
        .collect();
    let avalanche: Vec<_> = DebtService::order(&debts, PayoffOrdering::Avalanche)
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(snowball, vec!["Small", "Mid", "Hot"]);
    assert_eq!(avalanche, vec!["Hot", "Mid", "Small"]);
}

#[test]
fn debt_validation_rejects_bad_fields() {
    assert!(DebtService::validate(&Debt::new("Card", 100.0, 0.0, 10.0)).is_ok());
    for debt in [
        Debt::new("", 100.0, 5.0, 10.0),
        Debt::new("Card", 0.0, 5.0, 10.0),
        Debt::new("Card", 100.0, -1.0, 10.0),
        Debt::new("Card", 100.0, 5.0, 0.0),
    ] {
        assert!(matches!(
            DebtService::validate(&debt),
            Err(CoreError::Validation(_))
        ));
    }
}

#[test]
fn savings_bands_scale_with_income() {
    let bands = MetricsService::savings_bands(10000.0, 10000.0);
    assert_eq!(bands.low, 500.0);
    assert_eq!(bands.high, 1000.0);

    let none = MetricsService::savings_bands(0.0, -200.0);
    assert_eq!(none.low, 0.0);
    assert_eq!(none.high, 0.0);
    assert_eq!(none.remaining_after_high, -200.0);
}

#[test]
fn month_metrics_for_salary_rent_and_food() {
    let month = month(
        "2024-05",
        &[("Salary", 30000.0)],
        &[("Rent", 10000.0), ("Food", 5000.0)],
    );
    let metrics = MetricsService::compute(&month, None);
    assert_eq!(metrics.total_income, 30000.0);
    assert_eq!(metrics.total_expenses, 15000.0);
    assert_eq!(metrics.remaining, 15000.0);
    assert_eq!(metrics.bands.low, 1500.0);
    assert_eq!(metrics.bands.high, 3000.0);
    assert_eq!(metrics.bands.remaining_after_low, 13500.0);
    assert_eq!(metrics.bands.remaining_after_high, 12000.0);
    let biggest = metrics.biggest_expense.expect("biggest expense");
    assert_eq!(biggest.name, "Rent");
    assert_eq!(biggest.index, 0);
    assert!(metrics.goal.is_none());
}

#[test]
fn goal_progress_caps_percent_and_reports_shortfall() {
    let short = MetricsService::goal_progress(15000.0, 20000.0);
    assert_eq!(short.actual, 15000.0);
    assert_eq!(short.percent, 75.0);
    assert!(!short.met);
    assert_eq!(short.shortfall, 5000.0);

    let met = MetricsService::goal_progress(15000.0, 10000.0);
    assert_eq!(met.percent, 100.0);
    assert!(met.met);
    assert_eq!(met.shortfall, 0.0);

    let negative = MetricsService::goal_progress(-300.0, 1000.0);
    assert_eq!(negative.actual, 0.0);
    assert_eq!(negative.percent, 0.0);

    let goal = SavingsGoal::new(20000.0);
    let month = month("2024-05", &[("Salary", 30000.0)], &[("Rent", 15000.0)]);
    let metrics = MetricsService::compute(&month, goal);
    assert_eq!(metrics.goal.expect("goal progress").shortfall, 5000.0);
}

#[test]
fn biggest_expense_ties_resolve_to_first() {
    let entries = vec![Entry::new("A", 50.0), Entry::new("B", 80.0), Entry::new("C", 80.0)];
    let biggest = MetricsService::biggest_expense(&entries).expect("biggest");
    assert_eq!(biggest.name, "B");
    assert!(MetricsService::biggest_expense(&[]).is_none());
}

#[test]
fn expense_increase_of_twenty_percent_warns() {
    let history = history_of(vec![
        month("2024-01", &[("Salary", 5000.0)], &[("Rent", 1000.0)]),
        month("2024-02", &[("Salary", 5000.0)], &[("Rent", 1200.0)]),
    ]);
    let current = history.get(&key("2024-02")).expect("current").clone();
    let change = TrendService::expense_change(&history, &current).expect("previous month");
    assert_eq!(change.change, 200.0);
    assert!((change.percent - 20.0).abs() < 1e-9);

    let advisory = change.advisory().expect("increase advisory");
    assert_eq!(advisory.severity, Severity::Warning);
    assert!(matches!(advisory.kind, AdvisoryKind::ExpensesIncreased { percent } if (percent - 20.0).abs() < 1e-9));
}

#[test]
fn small_expense_changes_are_quiet() {
    let history = history_of(vec![
        month("2024-01", &[], &[("Rent", 1000.0)]),
        month("2024-02", &[], &[("Rent", 1050.0)]),
    ]);
    let current = history.get(&key("2024-02")).expect("current").clone();
    let change = TrendService::expense_change(&history, &current).expect("change");
    assert!(change.advisory().is_none());
}

fn expense_change_between(previous: f64, current: f64) -> ExpenseChange {
    let history = history_of(vec![
        month("2024-01", &[], &[("Rent", previous)]),
        month("2024-02", &[], &[("Rent", current)]),
    ]);
    let current = history.get(&key("2024-02")).expect("current").clone();
    TrendService::expense_change(&history, &current).expect("change")
}

#[test]
fn expense_decrease_of_twenty_percent_is_positive() {
    let change = expense_change_between(1000.0, 800.0);
    assert_eq!(change.change, -200.0);
    let advisory = change.advisory().expect("decrease advisory");
    assert_eq!(advisory.severity, Severity::Positive);
    assert!(matches!(advisory.kind, AdvisoryKind::ExpensesDecreased { percent } if (percent - 20.0).abs() < 1e-9));
}

#[test]
fn expense_changes_of_exactly_ten_percent_are_quiet() {
    assert!(expense_change_between(1000.0, 1100.0).advisory().is_none());
    assert!(expense_change_between(1000.0, 900.0).advisory().is_none());
}

#[test]
fn category_insight_threshold_and_half_rounding() {
    let first = month(
        "2024-01",
        &[],
        &[("Rent", 1000.0), ("Food", 1000.0), ("Fuel", 1000.0), ("Gym", 1000.0)],
    );
    let last = month(
        "2024-02",
        &[],
        &[("Rent", 1100.0), ("Food", 895.0), ("Fuel", 894.0), ("Gym", 1105.0)],
    );
    let insights = TrendService::category_insights(&first, &last);
    let reported: Vec<_> = insights
        .iter()
        .map(|insight| (insight.category.as_str(), insight.kind))
        .collect();
    assert_eq!(
        reported,
        vec![
            ("Fuel", InsightKind::Changed { percent: -11 }),
            ("Gym", InsightKind::Changed { percent: 11 }),
        ]
    );
}

#[test]
fn prediction_needs_two_months_and_averages_last_three() {
    let single = history_of(vec![month("2024-01", &[("Salary", 100.0)], &[])]);
    assert!(TrendService::predict(&single).is_none());

    let history = history_of(vec![
        month("2024-01", &[("Salary", 9999.0)], &[("Rent", 1.0)]),
        month("2024-02", &[("Salary", 300.0)], &[("Rent", 600.0)]),
        month("2024-03", &[("Salary", 300.0)], &[("Rent", 600.0)]),
        month("2024-04", &[("Salary", 600.0)], &[("Rent", 300.0)]),
    ]);
    let prediction = TrendService::predict(&history).expect("prediction");
    assert_eq!(prediction.months_used, 3);
    assert_eq!(prediction.avg_income, 400.0);
    assert_eq!(prediction.avg_expenses, 500.0);
    assert_eq!(prediction.predicted_remaining, -100.0);

    let current = history.latest().expect("latest").clone();
    let report = TrendService::analyze(&history, &current).expect("report");
    assert!(report
        .advisories
        .iter()
        .any(|a| a.severity == Severity::Critical
            && matches!(a.kind, AdvisoryKind::NegativePrediction { .. })));
}

#[test]
fn analyze_requires_two_months() {
    let history = history_of(vec![month("2024-01", &[("Salary", 100.0)], &[])]);
    let current = history.latest().expect("latest").clone();
    assert!(TrendService::analyze(&history, &current).is_none());
}

#[test]
fn savings_signal_bands() {
    match TrendService::savings_signal(10000.0, 9800.0) {
        SavingsSignal::Low { shortfall, .. } => assert_eq!(shortfall, 300.0),
        other => panic!("expected low savings, got {other:?}"),
    }
    assert!(matches!(
        TrendService::savings_signal(10000.0, 9000.0),
        SavingsSignal::Excellent { .. }
    ));
    assert!(matches!(
        TrendService::savings_signal(10000.0, 9300.0),
        SavingsSignal::Neutral { .. }
    ));
    assert!(matches!(
        TrendService::savings_signal(0.0, 500.0),
        SavingsSignal::Neutral { .. }
    ));
}

#[test]
fn category_insights_distinguish_new_and_removed() {
    let first = month(
        "2024-01",
        &[],
        &[("Rent", 1000.0), ("Food", 500.0), ("Gym", 300.0)],
    );
    let last = month(
        "2024-03",
        &[],
        &[("Rent", 1050.0), ("Food", 700.0), ("Travel", 200.0)],
    );
    let insights = TrendService::category_insights(&first, &last);
    let names: Vec<_> = insights.iter().map(|i| i.category.as_str()).collect();
    assert_eq!(names, vec!["Food", "Gym", "Travel"]);
    assert_eq!(insights[0].kind, InsightKind::Changed { percent: 40 });
    assert!(insights[0].is_increase());
    assert_eq!(insights[1].kind, InsightKind::Removed);
    assert_eq!(insights[1].change, -300.0);
    assert_eq!(insights[2].kind, InsightKind::New);
}

#[test]
fn monthly_summary_compares_to_previous_stored_month() {
    let history = history_of(vec![
        month("2024-01", &[("Salary", 5000.0)], &[("Rent", 2000.0)]),
        month("2024-03", &[("Salary", 5000.0)], &[("Rent", 1500.0)]),
    ]);
    let current = history.get(&key("2024-03")).expect("march").clone();
    let summary = TrendService::monthly_summary(&history, &current);
    assert_eq!(summary.remaining, 3500.0);
    assert_eq!(
        summary.comparison,
        Some(Comparison::Decreased {
            change: 500.0,
            percent: 25.0
        })
    );

    let first = history.get(&key("2024-01")).expect("january").clone();
    assert!(TrendService::monthly_summary(&history, &first).comparison.is_none());
}

#[test]
fn display_rounding_and_series() {
    assert_eq!(round2(0.125), 0.13);
    assert_eq!(round2(-0.125), -0.13);
    assert_eq!(round2(-1.234), -1.23);

    let usd = CurrencyCode::new("USD");
    let rates = RateTable::fallback();
    let converter = DisplayConverter::new(&usd, &rates);
    assert_eq!(converter.to_display(1000.0), 94.0);

    let month = month("2024-02", &[("Salary", 10000.0)], &[("Rent", 5000.0)]);
    let metrics = MetricsService::compute(&month, None);
    let pie = ChartSeries::with_savings(&month, &metrics, &converter);
    assert_eq!(pie.labels, vec!["Rent", "Save 5% (47)", "Save 10% (94)"]);
    assert_eq!(pie.values, vec![470.0, 47.0, 94.0]);
}

#[test]
fn bar_series_uses_category_union_in_first_seen_order() {
    let history = history_of(vec![
        month("2024-01", &[], &[("Rent", 1000.0), ("Food", 400.0)]),
        month("2024-02", &[], &[("Food", 500.0), ("Travel", 50.0)]),
    ]);
    let base = CurrencyCode::base();
    let rates = RateTable::fallback();
    let converter = DisplayConverter::new(&base, &rates);
    let bars = BarSeries::for_months(&history, &[key("2024-01"), key("2024-02")], &converter);
    assert_eq!(bars.labels, vec!["Rent", "Food", "Travel"]);
    assert_eq!(bars.datasets[0].values, vec![1000.0, 400.0, 0.0]);
    assert_eq!(bars.datasets[1].values, vec![0.0, 500.0, 50.0]);
}

#[test]
fn store_drops_zero_entries_and_orders_keys() {
    let mut store = LedgerStore::in_memory();
    store
        .put(month("2024-10", &[("Salary", 100.0), ("Nothing", 0.0)], &[]))
        .expect("put october");
    store
        .put(month("2024-9", &[("Salary", 90.0)], &[]))
        .expect("put september");

    let october = store.get(&key("2024-10")).expect("october stored");
    assert_eq!(october.incomes.len(), 1);
    assert_eq!(store.latest().expect("latest").key, key("2024-10"));
    assert_eq!(
        store.keys_sorted(SortOrder::Ascending),
        vec![key("2024-09"), key("2024-10")]
    );

    store.clear_all().expect("clear");
    assert!(store.latest().is_none());
}

#[test]
fn store_review_edits_convert_and_keep_blank_names() {
    let mut store = LedgerStore::in_memory();
    store
        .put(month("2024-04", &[], &[("Rent", 1000.0)]))
        .expect("put");
    let eur = CurrencyCode::new("EUR");
    let rates = RateTable::fallback();
    let edit = EntryEdit {
        name: Some("   ".into()),
        amount: Some(88.0),
        note: Some("  landlord ".into()),
    };
    store
        .edit_entry(&key("2024-04"), EntryKind::Expense, 0, edit, &eur, &rates)
        .expect("edit");
    let entry = &store.get(&key("2024-04")).expect("month").expenses[0];
    assert_eq!(entry.name, "Rent");
    assert!((entry.amount - 1000.0).abs() < 1e-9);
    assert_eq!(entry.note, "landlord");

    let err = store
        .remove_entry(&key("2024-04"), EntryKind::Income, 0)
        .expect_err("no incomes");
    assert!(matches!(err, CoreError::EntryNotFound { .. }));
    assert!(matches!(
        store.remove_entry(&key("2030-01"), EntryKind::Income, 0),
        Err(CoreError::MonthNotFound(_))
    ));
}

#[test]
fn store_manages_debts_and_goal() {
    let mut store = LedgerStore::in_memory();
    let id = store
        .add_debt(Debt::new("Card", 1200.0, 19.9, 100.0))
        .expect("add debt");
    assert!(store.add_debt(Debt::new("Bad", -1.0, 0.0, 1.0)).is_err());
    assert_eq!(store.debts().len(), 1);
    store.remove_debt(id).expect("remove debt");
    assert!(matches!(store.remove_debt(id), Err(CoreError::DebtNotFound(_))));

    assert!(matches!(store.set_goal(0.0), Err(CoreError::Validation(_))));
    store.set_goal(2500.0).expect("set goal");
    assert_eq!(store.goal().map(|g| g.amount()), Some(2500.0));
    store.clear_goal().expect("clear goal");
    assert!(store.goal().is_none());
}

#[test]
fn store_restores_in_memory_backups() {
    let mut store = LedgerStore::in_memory();
    store.put(month("2024-01", &[("Salary", 1.0)], &[])).expect("put");
    let backup = store.backup(Some("before reset")).expect("backup");
    store.clear_all().expect("clear");
    assert!(store.history().is_empty());

    store.restore_backup(&backup.id).expect("restore");
    assert_eq!(store.history().len(), 1);
    assert!(matches!(
        store.restore_backup("missing"),
        Err(CoreError::BackupNotFound(_))
    ));
}

#[test]
fn import_replaces_document_after_backing_up() {
    let mut store = LedgerStore::in_memory();
    store.put(month("2024-01", &[("Salary", 1.0)], &[])).expect("put");

    let mut incoming = StoreDocument::new();
    incoming.history.put(month("2023-05", &[("Salary", 2.0)], &[]));
    incoming.savings_goal = SavingsGoal::new(500.0);
    let backup = store.import_document(incoming).expect("import");

    assert!(backup.id.ends_with("pre-import"));
    assert_eq!(store.keys_sorted(SortOrder::Ascending), vec![key("2023-05")]);
    assert_eq!(store.goal().map(|goal| goal.amount()), Some(500.0));

    store.restore_backup(&backup.id).expect("restore");
    assert_eq!(store.keys_sorted(SortOrder::Ascending), vec![key("2024-01")]);
}

#[test]
fn draft_normalizes_into_month() {
    let draft = Draft {
        incomes: vec![RawEntry::new("Salary", 1000.0).with_frequency(Frequency::Weekly)],
        expenses: vec![
            RawEntry::new("Rent", 500.0).recurring(true),
            RawEntry::new("Blank", 0.0),
        ],
    };
    let base = CurrencyCode::base();
    let month = draft.to_month(key("2024-06"), &base, &RateTable::fallback());
    assert_eq!(month.incomes[0].amount, 1000.0 * 52.0 / 12.0);
    assert_eq!(month.expenses.len(), 1);
    assert!(month.expenses[0].recurring);
}

#[test]
fn draft_history_undo_redo_and_cap() {
    let mut history = DraftHistory::default();
    history.apply(|draft| draft.incomes.push(RawEntry::new("Salary", 100.0)));
    history.apply(|draft| draft.expenses.push(RawEntry::new("Rent", 50.0)));

    assert!(history.undo());
    assert!(history.current().expenses.is_empty());
    assert!(history.can_redo());
    assert!(history.redo());
    assert_eq!(history.current().expenses.len(), 1);

    history.undo();
    history.apply(|draft| draft.incomes.clear());
    assert!(!history.can_redo());

    for i in 0..(MAX_HISTORY + 10) {
        history.apply(|draft| draft.incomes.push(RawEntry::new("x", i as f64)));
    }
    assert_eq!(history.undo_depth(), MAX_HISTORY);

    let mut empty = DraftHistory::default();
    assert!(!empty.undo());
    assert!(!empty.redo());
}

#[test]
fn autofill_converts_to_display_currency() {
    let last = LedgerMonth::with_entries(
        key("2024-07"),
        vec![Entry::new("Salary", 10000.0)],
        vec![Entry::new("Rent", 3333.0).with_note("flat").recurring(true)],
    );
    let usd = CurrencyCode::new("USD");
    let draft = DraftService::autofill(&last, &usd, &RateTable::fallback());
    assert_eq!(draft.incomes[0].amount, 940.0);
    assert_eq!(draft.expenses[0].amount, 313.3);
    assert_eq!(draft.expenses[0].note, "flat");
    assert!(draft.expenses[0].recurring);
    assert_eq!(draft.expenses[0].frequency, Frequency::Monthly);
}
