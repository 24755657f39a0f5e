use kassa_core::{CoreError, EntryEdit, LedgerService, NormalizationService};
use kassa_domain::SortOrder;

use crate::cli::commands::CommandDefinition;
use crate::cli::core::{
    parse_kind, parse_month, parse_position, take_flag, take_option, CommandError, CommandResult,
    ShellContext,
};
use crate::cli::output::{self, money};
use crate::cli::render;
use crate::reports::MonthReport;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("months", "List saved months, newest first", "months", cmd_months),
        CommandDefinition::new(
            "report",
            "Show the budget for a saved month (latest by default)",
            "report [YYYY-MM]",
            cmd_report,
        ),
        CommandDefinition::new(
            "review",
            "List the entries of a saved month",
            "review <YYYY-MM>",
            cmd_review,
        ),
        CommandDefinition::new(
            "edit",
            "Change an entry of a saved month",
            "edit <YYYY-MM> <income|expense> <n> [--name <name>] [--amount <amount>] [--note <text>]",
            cmd_edit,
        ),
        CommandDefinition::new(
            "delete",
            "Delete an entry of a saved month",
            "delete <YYYY-MM> <income|expense> <n> [--yes]",
            cmd_delete,
        ),
        CommandDefinition::new(
            "merge",
            "Merge same-named entries of a saved month",
            "merge <YYYY-MM> <income|expense> [--yes]",
            cmd_merge,
        ),
    ]
}

fn cmd_months(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let keys = context.store.keys_sorted(SortOrder::Descending);
    output::section("Saved months");
    if keys.is_empty() {
        output::info("  Nothing saved yet. Add rows and run `calculate`.");
        return Ok(());
    }
    let converter = context.state.converter();
    for key in keys {
        if let Some(month) = context.store.get(&key) {
            output::info(format!(
                "  {key}  income {:>14}  expenses {:>14}",
                money(converter.to_display(month.total_income()), &context.state.currency),
                money(converter.to_display(month.total_expenses()), &context.state.currency)
            ));
        }
    }
    Ok(())
}

fn cmd_report(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let report = match args {
        [] => match MonthReport::latest(&context.state, &context.store) {
            Some(report) => report,
            None => {
                output::info("Nothing saved yet.");
                return Ok(());
            }
        },
        [raw] => MonthReport::build(&context.state, &context.store, &parse_month(raw)?)?,
        _ => return Err(CommandError::InvalidArguments("usage: report [YYYY-MM]".into())),
    };
    render::month_report(&context.state, &report);
    Ok(())
}

fn cmd_review(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = match args {
        [raw] => parse_month(raw)?,
        _ => return Err(CommandError::InvalidArguments("usage: review <YYYY-MM>".into())),
    };
    let month = context
        .store
        .get(&key)
        .ok_or(CoreError::MonthNotFound(key))?;
    render::month_entries(&context.state, month);
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (name, args) = take_option(args, "--name")?;
    let (amount, args) = take_option(&args, "--amount")?;
    let (note, args) = take_option(&args, "--note")?;
    let (key, kind, index) = match args.as_slice() {
        [month, kind, position] => (parse_month(month)?, parse_kind(kind)?, parse_position(position)?),
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: edit <YYYY-MM> <income|expense> <n> [--name ..] [--amount ..] [--note ..]"
                    .into(),
            ))
        }
    };
    let edit = EntryEdit {
        name: name.map(str::to_string),
        amount: amount.map(NormalizationService::coerce_amount),
        note: note.map(str::to_string),
    };
    if edit == EntryEdit::default() {
        output::info("Nothing to change.");
        return Ok(());
    }
    context.store.edit_entry(
        &key,
        kind,
        index,
        edit,
        &context.state.currency,
        &context.state.rates,
    )?;
    output::success(format!("Updated {kind} {} in {key}.", index + 1));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (yes, rest) = take_flag(args, "--yes");
    let (key, kind, index) = match rest.as_slice() {
        [month, kind, position] => (parse_month(month)?, parse_kind(kind)?, parse_position(position)?),
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: delete <YYYY-MM> <income|expense> <n> [--yes]".into(),
            ))
        }
    };
    let name = context
        .store
        .get(&key)
        .and_then(|month| month.entries(kind).get(index))
        .map(|entry| entry.name.clone())
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!("no {kind} entry at position {}", index + 1))
        })?;
    if !context.confirm(&format!("Delete {kind} `{name}` from {key}?"), yes)? {
        return Ok(());
    }
    context.store.remove_entry(&key, kind, index)?;
    output::success(format!("Deleted `{name}`."));
    Ok(())
}

fn cmd_merge(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (yes, rest) = take_flag(args, "--yes");
    let (key, kind) = match rest.as_slice() {
        [month, kind] => (parse_month(month)?, parse_kind(kind)?),
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: merge <YYYY-MM> <income|expense> [--yes]".into(),
            ))
        }
    };
    let mut merged = 0;
    let mut declined: Vec<String> = Vec::new();
    loop {
        let month = context
            .store
            .get(&key)
            .ok_or(CoreError::MonthNotFound(key))?;
        let entries = month.entries(kind);
        let next = LedgerService::find_duplicate_groups(entries)
            .into_iter()
            .find(|group| !declined.contains(&entries[group[0]].name.to_lowercase()));
        let Some(group) = next else {
            break;
        };
        let name = entries[group[0]].name.clone();
        let prompt = format!("Merge {} entries named `{name}`?", group.len());
        if context.confirm(&prompt, yes)? {
            context.store.merge_duplicates(&key, kind, &group)?;
            merged += 1;
        } else {
            declined.push(name.to_lowercase());
        }
    }
    if merged == 0 {
        output::info(format!("No {kind} entries merged in {key}."));
    } else {
        output::success(format!("Merged {merged} group(s) of {kind} entries in {key}."));
    }
    Ok(())
}
