use std::{env, path::PathBuf, sync::Once};

use chrono::NaiveDate;
use kassa_core::{Clock, FixedClock, SystemClock};

static TRACING_INIT: Once = Once::new();

/// Overrides every kassa directory when set.
pub const HOME_ENV: &str = "KASSA_HOME";
/// Pins the current date (`YYYY-MM-DD`), mainly for scripted sessions.
pub const TODAY_ENV: &str = "KASSA_TODAY";

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "kassa=info".parse::<Directive>() {
            filter = filter.add_directive(directive);
        }

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Base directory from `KASSA_HOME`, if set.
pub fn app_home() -> Option<PathBuf> {
    env::var_os(HOME_ENV).map(PathBuf::from)
}

/// System clock, or a fixed one when `KASSA_TODAY` holds a valid date.
pub fn clock_from_env() -> Box<dyn Clock> {
    match env::var(TODAY_ENV)
        .ok()
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
    {
        Some(date) => Box::new(FixedClock::on(date)),
        None => Box::new(SystemClock),
    }
}
