use crate::cli::commands::CommandDefinition;
use crate::cli::core::{parse_number, CommandError, CommandResult, ShellContext};
use crate::cli::output::{self, money};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "goal",
        "Show, set or clear the monthly savings goal",
        "goal | goal set <amount> | goal clear",
        cmd_goal,
    )]
}

fn cmd_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let converter = context.state.converter();
    match args {
        [] => match context.store.goal() {
            Some(goal) => output::info(format!(
                "Savings goal: {} per month",
                money(converter.to_display(goal.amount()), &context.state.currency)
            )),
            None => output::info("No savings goal set."),
        },
        ["set", amount] => {
            let display = parse_number(amount, "goal")?;
            context.store.set_goal(converter.to_base(display))?;
            output::success(format!(
                "Savings goal set to {}.",
                money(display, &context.state.currency)
            ));
        }
        ["clear"] => {
            context.store.clear_goal()?;
            output::success("Savings goal cleared.");
        }
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: goal | goal set <amount> | goal clear".into(),
            ))
        }
    }
    Ok(())
}
