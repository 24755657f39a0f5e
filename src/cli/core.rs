use std::{env, io, path::PathBuf};

use dialoguer::{theme::ColorfulTheme, Confirm};
use strsim::levenshtein;
use thiserror::Error;
use tracing::info;

use kassa_config::{Config, ConfigError, ConfigManager};
use kassa_core::{Clock, CoreError, DraftHistory, LedgerStore};
use kassa_domain::{EntryKind, MonthKey};
use kassa_storage_json::JsonLedgerRepository;

use crate::app::AppState;
use crate::cli::commands::{self, CommandDefinition, CommandRegistry};
use crate::cli::output;
use crate::errors::{CliError, KassaError};
use crate::rates::{RateBoard, RateService};
use crate::utils;

/// Skips the live rate fetch when set; the fallback table is used instead.
pub const OFFLINE_ENV: &str = "KASSA_OFFLINE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<KassaError> for CommandError {
    fn from(err: KassaError) -> Self {
        match err {
            KassaError::Core(err) => CommandError::Core(err),
            KassaError::Config(err) => CommandError::Config(err),
            KassaError::Io(err) => CommandError::Io(err),
            other => CommandError::Message(other.to_string()),
        }
    }
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    pub(crate) config_manager: ConfigManager,
    pub(crate) config: Config,
    pub(crate) store: LedgerStore,
    pub(crate) state: AppState,
    pub(crate) rates: RateBoard,
    pub(crate) drafts: DraftHistory,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = match utils::app_home() {
            Some(home) => ConfigManager::with_base_dir(home)?,
            None => ConfigManager::with_default_location()?,
        };
        let config = config_manager.load()?;
        output::set_color_enabled(config.ui_color_enabled && mode == CliMode::Interactive);

        let store = open_store(&config)?;
        let mut context = Self {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            state: AppState::from_config(&config, kassa_domain::RateTable::fallback()),
            config_manager,
            config,
            store,
            rates: RateBoard::new(),
            drafts: DraftHistory::default(),
            clock: utils::clock_from_env(),
            running: true,
        };
        output::set_theme(context.state.theme);
        context.refresh_rates();
        Ok(context)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        format!("kassa [{}]> ", self.state.currency)
    }

    pub(crate) fn current_month(&self) -> MonthKey {
        self.clock.current_month()
    }

    /// Fetches live rates unless offline and rebuilds the app state around them.
    pub(crate) fn refresh_rates(&mut self) {
        if env::var_os(OFFLINE_ENV).is_some() {
            info!("offline mode; using fallback exchange rates");
        } else {
            match RateService::new(self.config.rates_url.clone()) {
                Ok(service) => {
                    self.rates.refresh(&service);
                }
                Err(err) => output::warning(format!("Rate client unavailable: {err}")),
            }
        }
        self.state = self.state.with_rates(self.rates.table().clone());
    }

    /// Reapplies the persisted preferences to the app state.
    pub(crate) fn sync_state(&mut self) {
        self.state = self
            .state
            .with_currency(self.config.currency.clone())
            .with_lang(self.config.lang)
            .with_theme(self.config.theme)
            .with_strategy(self.config.debt_strategy);
        output::set_theme(self.state.theme);
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.get(command).map(|definition| definition.handler) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                output::info(format!("Suggestion: `{best}`?"));
            }
        }
    }

    /// Asks before a destructive action. Script mode never prompts: it proceeds
    /// only when the command's confirmation flag was passed.
    pub(crate) fn confirm(&self, prompt: &str, assume_yes: bool) -> Result<bool, CommandError> {
        if assume_yes {
            return Ok(true);
        }
        if self.mode == CliMode::Script {
            output::warning(format!("{prompt} Not confirmed, skipped."));
            return Ok(false);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Exit shell?")
            .default(true)
            .interact()
            .map_err(|err| CliError::Input(err.to_string()))
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                output::error(other);
                Ok(())
            }
        }
    }
}

fn open_store(config: &Config) -> Result<LedgerStore, CliError> {
    let data_root = data_root(config);
    let repository = JsonLedgerRepository::new(data_root)?;
    Ok(LedgerStore::open(Box::new(repository))?)
}

fn data_root(config: &Config) -> PathBuf {
    match (&config.data_root, utils::app_home()) {
        (Some(path), _) => path.clone(),
        (None, Some(home)) => home.join("data"),
        (None, None) => config.resolve_data_root(),
    }
}

/// Removes `flag` from `args`, reporting whether it was present.
pub(crate) fn take_flag<'a>(args: &[&'a str], flag: &str) -> (bool, Vec<&'a str>) {
    let present = args.iter().any(|arg| *arg == flag);
    let rest = args.iter().copied().filter(|arg| *arg != flag).collect();
    (present, rest)
}

/// Value following `--name`, removed from `args` together with the flag.
pub(crate) fn take_option<'a>(
    args: &[&'a str],
    name: &str,
) -> Result<(Option<&'a str>, Vec<&'a str>), CommandError> {
    let Some(position) = args.iter().position(|arg| *arg == name) else {
        return Ok((None, args.to_vec()));
    };
    let value = args.get(position + 1).copied().ok_or_else(|| {
        CommandError::InvalidArguments(format!("`{name}` expects a value"))
    })?;
    let rest = args
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != position && *index != position + 1)
        .map(|(_, arg)| *arg)
        .collect();
    Ok((Some(value), rest))
}

pub(crate) fn parse_month(raw: &str) -> Result<MonthKey, CommandError> {
    raw.parse()
        .map_err(|err| CommandError::InvalidArguments(format!("{err}")))
}

pub(crate) fn parse_kind(raw: &str) -> Result<EntryKind, CommandError> {
    raw.parse().map_err(CommandError::InvalidArguments)
}

/// One-based position as shown in listings, returned zero-based.
pub(crate) fn parse_position(raw: &str) -> Result<usize, CommandError> {
    match raw.parse::<usize>() {
        Ok(position) if position > 0 => Ok(position - 1),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{raw}` is not a valid position (use the number shown in the listing)"
        ))),
    }
}

/// Strict number parsing for settings that must not silently become zero.
pub(crate) fn parse_number(raw: &str, what: &str) -> Result<f64, CommandError> {
    raw.trim()
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("{what} must be a number, got `{raw}`")))
}
