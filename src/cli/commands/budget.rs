use kassa_core::{Draft, DraftService, LedgerService, NormalizationService, RawEntry};
use kassa_domain::{EntryKind, Frequency, LedgerMonth};
use tracing::debug;

use crate::cli::commands::CommandDefinition;
use crate::cli::core::{
    parse_month, parse_position, take_flag, take_option, CommandError, CommandResult,
    ShellContext,
};
use crate::cli::output::{self, money};
use crate::cli::render;
use crate::reports::MonthReport;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "income",
            "Add or remove an income row in the draft",
            "income add <name> <amount> [frequency] [--note <text>] | income remove <n>",
            cmd_income,
        ),
        CommandDefinition::new(
            "expense",
            "Add or remove an expense row in the draft",
            "expense add <name> <amount> [frequency] [--recurring] [--note <text>] | expense remove <n>",
            cmd_expense,
        ),
        CommandDefinition::new("draft", "Show the rows being entered", "draft", cmd_draft),
        CommandDefinition::new("undo", "Undo the last draft change", "undo", cmd_undo),
        CommandDefinition::new("redo", "Redo an undone draft change", "redo", cmd_redo),
        CommandDefinition::new(
            "autofill",
            "Fill the draft from the latest saved month",
            "autofill",
            cmd_autofill,
        ),
        CommandDefinition::new(
            "discard",
            "Clear every draft row",
            "discard",
            cmd_discard,
        ),
        CommandDefinition::new(
            "calculate",
            "Save the draft as a month and show its budget",
            "calculate [YYYY-MM] [--merge]",
            cmd_calculate,
        ),
    ]
}

fn cmd_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    edit_rows(context, EntryKind::Income, args)
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    edit_rows(context, EntryKind::Expense, args)
}

fn edit_rows(context: &mut ShellContext, kind: EntryKind, args: &[&str]) -> CommandResult {
    match args.split_first() {
        Some((&"add", rest)) => add_row(context, kind, rest),
        Some((&"remove", [position])) => {
            let index = parse_position(position)?;
            if index >= context.drafts.current().rows(kind).len() {
                return Err(CommandError::InvalidArguments(format!(
                    "no {kind} row at position {position}"
                )));
            }
            context.drafts.apply(|draft| {
                draft.rows_mut(kind).remove(index);
            });
            output::success(format!("Removed {kind} row {position}."));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(format!(
            "usage: {kind} add <name> <amount> [frequency] | {kind} remove <n>"
        ))),
    }
}

fn add_row(context: &mut ShellContext, kind: EntryKind, args: &[&str]) -> CommandResult {
    let (recurring, args) = take_flag(args, "--recurring");
    let (note, args) = take_option(&args, "--note")?;
    let (name, raw_amount, frequency) = match args.as_slice() {
        [name, amount] => (*name, *amount, Frequency::Monthly),
        [name, amount, frequency] => {
            let frequency = frequency
                .parse::<Frequency>()
                .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
            (*name, *amount, frequency)
        }
        _ => {
            return Err(CommandError::InvalidArguments(format!(
                "usage: {kind} add <name> <amount> [frequency]"
            )))
        }
    };
    if recurring && kind == EntryKind::Income {
        output::warning("Only expenses can be recurring; flag ignored.");
    }

    let amount = NormalizationService::coerce_amount(raw_amount);
    if amount == 0.0 {
        output::warning(format!(
            "`{raw_amount}` is not a positive amount; the row counts as empty."
        ));
    }
    let row = RawEntry::new(name, amount)
        .with_frequency(frequency)
        .with_note(note.unwrap_or_default())
        .recurring(recurring && kind == EntryKind::Expense);
    context.drafts.apply(|draft| draft.rows_mut(kind).push(row));
    output::success(format!(
        "Added {kind} `{name}` ({} {frequency}).",
        money(amount, &context.state.currency)
    ));
    Ok(())
}

fn cmd_draft(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let draft = context.drafts.current();
    let currency = &context.state.currency;
    output::section(format!("Draft (amounts in {currency})"));
    for kind in [EntryKind::Income, EntryKind::Expense] {
        output::info(format!("{}:", if kind == EntryKind::Income { "Incomes" } else { "Expenses" }));
        let rows = draft.rows(kind);
        if rows.is_empty() {
            output::info("  (none)");
        }
        for (index, row) in rows.iter().enumerate() {
            let mut line = format!(
                "  {:>2}. {:<24} {:>14} {}",
                index + 1,
                row.name,
                money(row.amount, currency),
                row.frequency
            );
            if row.recurring {
                line.push_str("  [recurring]");
            }
            if !row.note.is_empty() {
                line.push_str(&format!("  ({})", row.note));
            }
            output::info(line);
        }
    }
    output::hint(format!(
        "{} undo step(s) available{}",
        context.drafts.undo_depth(),
        if context.drafts.can_redo() { ", redo available" } else { "" }
    ));
    Ok(())
}

fn cmd_undo(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.drafts.undo() {
        output::success("Undone.");
    } else {
        output::info("Nothing to undo.");
    }
    Ok(())
}

fn cmd_redo(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.drafts.redo() {
        output::success("Redone.");
    } else {
        output::info("Nothing to redo.");
    }
    Ok(())
}

fn cmd_autofill(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let Some(latest) = context.store.latest() else {
        output::info("No saved month to copy from.");
        return Ok(());
    };
    let key = latest.key;
    let draft = DraftService::autofill(latest, &context.state.currency, &context.state.rates);
    context.drafts.replace(draft);
    output::success(format!("Draft filled from {key}."));
    Ok(())
}

fn cmd_discard(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.drafts.current().is_empty() {
        output::info("Draft is already empty.");
        return Ok(());
    }
    context.drafts.replace(Draft::default());
    output::success("Draft cleared. Use `undo` to bring it back.");
    Ok(())
}

fn cmd_calculate(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (merge, rest) = take_flag(args, "--merge");
    let key = match rest.as_slice() {
        [] => context.current_month(),
        [raw] => parse_month(raw)?,
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: calculate [YYYY-MM] [--merge]".into(),
            ))
        }
    };

    let mut month = context
        .drafts
        .current()
        .to_month(key, &context.state.currency, &context.state.rates);
    if month.is_empty() {
        output::warning("Nothing to save: every draft row is empty.");
        return Ok(());
    }

    for kind in [EntryKind::Income, EntryKind::Expense] {
        offer_merges(context, &mut month, kind, merge)?;
    }
    if context.store.get(&key).is_some() {
        output::info(format!("Replacing the saved data for {key}."));
    }
    debug!(month = %key, incomes = month.incomes.len(), expenses = month.expenses.len(), "saving draft");
    context.store.put(month)?;

    let report = MonthReport::build(&context.state, &context.store, &key)?;
    render::month_report(&context.state, &report);
    Ok(())
}

/// Offers each duplicate-name group for merging, one group at a time.
fn offer_merges(
    context: &ShellContext,
    month: &mut LedgerMonth,
    kind: EntryKind,
    assume_yes: bool,
) -> CommandResult {
    let mut declined: Vec<String> = Vec::new();
    loop {
        let groups = LedgerService::find_duplicate_groups(month.entries(kind));
        let next = groups.into_iter().find(|group| {
            let name = month.entries(kind)[group[0]].name.to_lowercase();
            !declined.contains(&name)
        });
        let Some(group) = next else {
            return Ok(());
        };
        let name = month.entries(kind)[group[0]].name.clone();
        let prompt = format!("Merge {} {kind} entries named `{name}`?", group.len());
        if context.confirm(&prompt, assume_yes)? {
            LedgerService::merge_group(month.entries_mut(kind), &group)?;
            output::success(format!("Merged `{name}`."));
        } else {
            declined.push(name.to_lowercase());
        }
    }
}
