use crate::cli::commands::CommandDefinition;
use crate::cli::core::{parse_month, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::render;
use crate::reports::TrendsView;

/// Months compared when none are named.
const DEFAULT_MONTHS: usize = 3;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "trends",
        "Compare expense categories across months",
        "trends [YYYY-MM YYYY-MM ...]",
        cmd_trends,
    )]
}

fn cmd_trends(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let months = if args.is_empty() {
        context
            .store
            .history()
            .recent(DEFAULT_MONTHS)
            .iter()
            .map(|month| month.key)
            .collect::<Vec<_>>()
    } else {
        args.iter()
            .map(|raw| parse_month(raw))
            .collect::<Result<Vec<_>, _>>()?
    };
    if months.len() < 2 {
        output::info("Save at least two months to compare trends.");
        return Ok(());
    }
    let view = TrendsView::build(&context.state, context.store.history(), &months)?;
    render::trends(&context.state, &view);
    Ok(())
}
