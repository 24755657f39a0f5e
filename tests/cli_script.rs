mod common;

use predicates::prelude::*;
use predicates::str::contains;

use common::{kassa_home, script};

#[test]
fn calculate_saves_current_month_and_prints_budget() {
    let home = kassa_home();
    let input = "income add Salary 30000\n\
                 expense add Rent 10000 --recurring\n\
                 expense add Food 5000 --note \"groceries\"\n\
                 calculate\n\
                 exit\n";

    script(&home, input)
        .assert()
        .success()
        .stdout(contains("Budget for 2024-03"))
        .stdout(contains("Remaining       : 15000.00 kr"))
        .stdout(contains("Save 5%         : 1500.00 kr"))
        .stdout(contains("Biggest expense : Rent"))
        .stdout(contains("Save at least two months"));

    let json = std::fs::read_to_string(home.join("data").join("kassa.json")).unwrap();
    assert!(json.contains("\"2024-03\""));
    assert!(json.contains("\"schema_version\": 1"));
}

#[test]
fn weekly_amounts_are_normalized_to_monthly() {
    let home = kassa_home();
    let input = "income add Wage 1200 weekly\ncalculate 2024-01\n";

    script(&home, input)
        .assert()
        .success()
        .stdout(contains("Total income    : 5200.00 kr"));
}

#[test]
fn duplicate_entries_merge_only_when_confirmed() {
    let home = kassa_home();
    let input = "income add Salary 1000\n\
                 expense add Rent 100\n\
                 expense add rent 200 --note \"late fee\"\n\
                 calculate 2024-01\n\
                 calculate 2024-02 --merge\n\
                 review 2024-02\n";

    script(&home, input)
        .assert()
        .success()
        .stdout(contains("Merge 2 expense entries named `Rent`? Not confirmed, skipped."))
        .stdout(contains("Merged `Rent`."))
        .stdout(contains("300.00 kr  (late fee)"));
}

#[test]
fn expense_increase_is_flagged_in_report_and_trends() {
    let home = kassa_home();
    let input = "income add Salary 30000\n\
                 expense add Rent 1000\n\
                 calculate 2024-01\n\
                 discard\n\
                 income add Salary 30000\n\
                 expense add Rent 1200\n\
                 expense add Gym 300\n\
                 calculate 2024-02\n\
                 trends\n";

    script(&home, input)
        .assert()
        .success()
        .stdout(contains("Expenses rose 50.0% compared to last month."))
        .stdout(contains("vs previous     : expenses up 500.00 kr"))
        .stdout(contains("Rent: +20% (1000.00 kr -> 1200.00 kr)"))
        .stdout(contains("Gym: new expense of 300.00 kr"));
}

#[test]
fn undo_and_redo_walk_the_draft_history() {
    let home = kassa_home();
    let input = "income add Alpha 1\nincome add Bravo 2\nundo\ndraft\nredo\nredo\n";

    script(&home, input)
        .assert()
        .success()
        .stdout(contains("Undone."))
        .stdout(contains("1 undo step(s) available, redo available"))
        .stdout(contains("Redone."))
        .stdout(contains("Nothing to redo."));
}

#[test]
fn autofill_copies_latest_month_into_draft() {
    let home = kassa_home();
    let input = "income add Salary 25000\n\
                 calculate 2024-01\n\
                 discard\n\
                 autofill\n\
                 draft\n";

    script(&home, input)
        .assert()
        .success()
        .stdout(contains("Draft filled from 2024-01."))
        .stdout(contains("25000.00 kr monthly"));
}

#[test]
fn review_edits_and_deletes_with_confirmation() {
    let home = kassa_home();
    let input = "income add Salary 1000\n\
                 expense add Coffee 50\n\
                 calculate 2024-01\n\
                 edit 2024-01 expense 1 --name Cafe --amount 75\n\
                 delete 2024-01 income 1\n\
                 delete 2024-01 expense 5 --yes\n\
                 review 2024-01\n";

    script(&home, input)
        .assert()
        .success()
        .stdout(contains("Updated expense 1 in 2024-01."))
        .stdout(contains("Delete income `Salary` from 2024-01? Not confirmed, skipped."))
        .stdout(contains("no expense entry at position 5"))
        .stdout(contains("Cafe"))
        .stdout(contains("75.00 kr"))
        .stdout(contains("Salary"));
}

#[test]
fn reset_requires_confirmation_flag() {
    let home = kassa_home();
    let input = "income add Salary 1000\n\
                 calculate\n\
                 reset\n\
                 months\n\
                 reset --yes\n\
                 months\n";

    script(&home, input)
        .assert()
        .success()
        .stdout(contains("Delete every stored month? Not confirmed, skipped."))
        .stdout(contains("  2024-03  income"))
        .stdout(contains("All months deleted."))
        .stdout(contains("Nothing saved yet."));
}

#[test]
fn debts_simulate_with_configured_strategy() {
    let home = kassa_home();
    let input = "debt add Card 1000 0 1000\n\
                 debt add Loan 5000 5 100\n\
                 debt list\n\
                 debt simulate rollover\n\
                 debt remove 2 --yes\n\
                 debt simulate\n";

    script(&home, input)
        .assert()
        .success()
        .stdout(contains("Total: 6000.00 kr owed, 1100.00 kr minimum per month"))
        .stdout(contains("Payoff projection (rollover)"))
        .stdout(contains("Debt `Loan` removed."))
        .stdout(contains("Payoff projection (minimum-only)"))
        .stdout(contains("Snowball (smallest balance first): 1 months, 0.00 kr interest"));
}

#[test]
fn invalid_debt_is_rejected() {
    let home = kassa_home();
    script(&home, "debt add Card 1000 abc 50\ndebt add Card -5 3 50\n")
        .assert()
        .success()
        .stdout(contains("rate must be a number, got `abc`"))
        .stdout(contains("Validation failed"));
}

#[test]
fn savings_goal_appears_in_report() {
    let home = kassa_home();
    let input = "goal set 2000\n\
                 goal\n\
                 income add Salary 10000\n\
                 expense add Rent 9000\n\
                 calculate 2024-01\n\
                 goal clear\n\
                 goal set 0\n";

    script(&home, input)
        .assert()
        .success()
        .stdout(contains("Savings goal: 2000.00 kr per month"))
        .stdout(contains("Savings goal    : 1000.00 kr of 2000.00 kr (50%, 1000.00 kr short)"))
        .stdout(contains("Savings goal cleared."))
        .stdout(contains("savings goal must be a positive amount"));
}

#[test]
fn display_currency_converts_with_fallback_rates() {
    let home = kassa_home();
    let input = "income add Salary 30000\n\
                 calculate 2024-01\n\
                 config set currency USD\n\
                 report 2024-01\n\
                 rates\n";

    script(&home, input)
        .assert()
        .success()
        .stdout(contains("`currency` updated."))
        .stdout(contains("Total income    : 2820.00 $"))
        .stdout(contains("(fallback)"));

    let config = std::fs::read_to_string(home.join("config").join("config.json")).unwrap();
    assert!(config.contains("\"USD\""));
}

#[test]
fn unknown_settings_and_commands_are_reported() {
    let home = kassa_home();
    script(&home, "config set colour blue\nreprot\nreport 2020-01\n")
        .assert()
        .success()
        .stdout(contains("Invalid value for `colour`"))
        .stdout(contains("Unknown command `reprot`"))
        .stdout(contains("Suggestion: `report`?"))
        .stdout(contains("No data stored for month 2020-01"));
}

#[test]
fn export_and_import_round_trip_through_files() {
    let home = kassa_home();
    let export = home.join("export.json");
    let input = format!(
        "income add Salary 1000\ncalculate 2024-01\nexport {}\nreset --yes\nimport {} --yes\nmonths\n",
        export.display(),
        export.display()
    );

    script(&home, &input)
        .assert()
        .success()
        .stdout(contains("Ledger exported to"))
        .stdout(contains("Previous ledger saved as"))
        .stdout(contains("  2024-01  income"));
}

#[test]
fn legacy_browser_export_is_upgraded_on_import() {
    let home = kassa_home();
    let legacy = home.join("legacy.json");
    std::fs::write(
        &legacy,
        r#"{"budgetHistory":"{\"2023-9\":{\"incomes\":[{\"name\":\"Salary\",\"amount\":20000}],\"expenses\":[]}}","savingsGoal":"1500"}"#,
    )
    .unwrap();
    let input = format!("import {} --yes\nmonths\ngoal\n", legacy.display());

    script(&home, &input)
        .assert()
        .success()
        .stdout(contains("  2023-09  income"))
        .stdout(contains("Savings goal: 1500.00 kr per month"));
}

#[test]
fn backups_can_be_listed_and_restored() {
    let home = kassa_home();
    let input = "income add Salary 1000\n\
                 calculate 2024-01\n\
                 backup before reset\n\
                 backups\n\
                 reset --yes\n";

    script(&home, input)
        .assert()
        .success()
        .stdout(contains("Backup created: kassa_"))
        .stdout(contains("before-reset"));

    let backups = std::fs::read_dir(home.join("data").join("backups"))
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .find(|name| name.contains("before-reset"))
        .expect("named backup");
    let input = format!("restore {backups} --yes\nmonths\n");
    script(&home, &input)
        .assert()
        .success()
        .stdout(contains("Restored backup"))
        .stdout(contains("  2024-01  income"));
}

#[test]
fn exit_stops_processing_further_lines() {
    let home = kassa_home();
    script(&home, "exit\nversion\n")
        .assert()
        .success()
        .stdout(contains("Kassa").not());
}
