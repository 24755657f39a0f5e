use kassa_domain::{Debt, PaymentStrategy};

use crate::cli::commands::CommandDefinition;
use crate::cli::core::{
    parse_number, parse_position, take_flag, CommandError, CommandResult, ShellContext,
};
use crate::cli::output;
use crate::cli::render;
use crate::reports::DebtReport;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "debt",
        "Track debts and project their payoff",
        "debt add <name> <balance> <rate%> <min-payment> | debt list | debt remove <n> [--yes] | debt simulate [minimum-only|rollover]",
        cmd_debt,
    )]
}

fn cmd_debt(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.split_first() {
        Some((&"add", rest)) => add(context, rest),
        None | Some((&"list", [])) => list(context),
        Some((&"remove", rest)) => remove(context, rest),
        Some((&"simulate", rest)) => simulate(context, rest),
        _ => Err(CommandError::InvalidArguments(
            "usage: debt add|list|remove|simulate".into(),
        )),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name, balance, rate, min_payment] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: debt add <name> <balance> <rate%> <min-payment>".into(),
        ));
    };
    let converter = context.state.converter();
    let debt = Debt::new(
        *name,
        converter.to_base(parse_number(balance, "balance")?),
        parse_number(rate, "rate")?,
        converter.to_base(parse_number(min_payment, "minimum payment")?),
    );
    context.store.add_debt(debt)?;
    output::success(format!("Debt `{name}` added."));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let report = DebtReport::build(&context.state, context.store.debts());
    render::debts(&context.state, &report, context.store.debts());
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (yes, rest) = take_flag(args, "--yes");
    let [position] = rest.as_slice() else {
        return Err(CommandError::InvalidArguments("usage: debt remove <n> [--yes]".into()));
    };
    let index = parse_position(position)?;
    let (id, name) = context
        .store
        .debts()
        .get(index)
        .map(|debt| (debt.id, debt.name.clone()))
        .ok_or_else(|| CommandError::InvalidArguments(format!("no debt at position {position}")))?;
    if !context.confirm(&format!("Remove debt `{name}`?"), yes)? {
        return Ok(());
    }
    context.store.remove_debt(id)?;
    output::success(format!("Debt `{name}` removed."));
    Ok(())
}

fn simulate(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let state = match args {
        [] => context.state.clone(),
        [raw] => {
            let strategy: PaymentStrategy = raw.parse().map_err(CommandError::InvalidArguments)?;
            context.state.with_strategy(strategy)
        }
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: debt simulate [minimum-only|rollover]".into(),
            ))
        }
    };
    let report = DebtReport::build(&state, context.store.debts());
    render::payoff(&state, &report);
    Ok(())
}
