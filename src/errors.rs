use thiserror::Error;

use kassa_config::ConfigError;
use kassa_core::CoreError;

/// Application-level failures surfaced to the shell and the binary.
#[derive(Debug, Error)]
pub enum KassaError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Rate request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Rate response rejected: {0}")]
    Rates(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that stop the shell itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] KassaError),
    #[error("Input error: {0}")]
    Input(String),
    #[error("{0}")]
    Command(String),
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Core(KassaError::Io(err))
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::Core(KassaError::Core(err))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Core(KassaError::Config(err))
    }
}
