use kassa_config::Config;
use kassa_domain::RateSource;

use crate::cli::commands::CommandDefinition;
use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::output;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "config",
            "View and manage preferences",
            "config [show|set <key> <value>|backup [note]|backups|restore <name>]",
            cmd_config,
        ),
        CommandDefinition::new(
            "rates",
            "Show exchange rates or fetch fresh ones",
            "rates [refresh]",
            cmd_rates,
        ),
    ]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return show_config(context);
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    Config::KEYS.join("|")
                )));
            }
            let key = args[1];
            let value = args[2..].join(" ");
            set_config_value(context, key, value.trim())
        }
        "backup" => {
            let note = (args.len() > 1).then(|| args[1..].join(" "));
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            output::success(format!("Configuration backup created: {name}"));
            Ok(())
        }
        "backups" => {
            let backups = context.config_manager.list_backups()?;
            output::section("Configuration backups");
            if backups.is_empty() {
                output::info("  No backups yet.");
            }
            for (index, name) in backups.iter().enumerate() {
                output::info(format!("  {:>2}. {name}", index + 1));
            }
            Ok(())
        }
        "restore" => {
            let name = args.get(1).ok_or_else(|| {
                CommandError::InvalidArguments("usage: config restore <name>".into())
            })?;
            let previous = context.config.clone();
            context.config = context.config_manager.restore(name)?;
            apply_changes(context, &previous);
            output::success(format!("Configuration restored from `{name}`."));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(
            "usage: config [show|set <key> <value>|backup [note]|backups|restore <name>]".into(),
        )),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    let config = &context.config;
    output::section("Configuration");
    output::info(format!("  currency         : {}", config.currency));
    output::info(format!("  lang             : {}", config.lang));
    output::info(format!("  theme            : {}", config.theme));
    output::info(format!("  debt_strategy    : {}", config.debt_strategy));
    output::info(format!("  rates_url        : {}", config.rates_url));
    output::info(format!("  ui_color_enabled : {}", config.ui_color_enabled));
    output::info(format!(
        "  data_root        : {}",
        config
            .data_root
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "default".into())
    ));
    output::info(format!(
        "  config file      : {}",
        context.config_manager.config_path().display()
    ));
    Ok(())
}

fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let previous = context.config.clone();
    let mut updated = previous.clone();
    updated.set(key, value)?;
    context.config_manager.save(&updated)?;
    context.config = updated;
    apply_changes(context, &previous);
    output::success(format!("`{key}` updated."));
    Ok(())
}

/// Pushes persisted preferences into the running shell.
fn apply_changes(context: &mut ShellContext, previous: &Config) {
    context.sync_state();
    if previous.rates_url != context.config.rates_url
        || previous.currency != context.config.currency
        || previous.lang != context.config.lang
    {
        context.refresh_rates();
    }
    if previous.ui_color_enabled != context.config.ui_color_enabled {
        output::set_color_enabled(
            context.config.ui_color_enabled && context.mode == CliMode::Interactive,
        );
    }
    if previous.data_root != context.config.data_root {
        output::hint("The new data location is used from the next start.");
    }
    if context.state.currency != context.state.rates.base
        && context.state.rates.rate(&context.state.currency).is_none()
    {
        output::warning(format!(
            "No exchange rate for {}; amounts are shown unconverted.",
            context.state.currency
        ));
    }
}

fn cmd_rates(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {}
        ["refresh"] => context.refresh_rates(),
        _ => return Err(CommandError::InvalidArguments("usage: rates [refresh]".into())),
    }
    let table = &context.state.rates;
    let source = match table.source {
        RateSource::Live => "live",
        RateSource::Fallback => "fallback",
    };
    output::section(format!("Exchange rates per 1 {} ({source})", table.base));
    for (code, rate) in &table.rates {
        output::info(format!("  {:<4} {rate:>12.4}", code.as_str()));
    }
    Ok(())
}
