//! Kassa is a personal budgeting engine: monthly income and expense ledgers,
//! savings recommendations, trend analysis and debt payoff projections, driven
//! from an interactive terminal shell.

pub mod app;
pub mod cli;
pub mod errors;
pub mod rates;
pub mod reports;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Kassa tracing initialized.");
    });
}
