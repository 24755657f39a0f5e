//! kassa-core
//!
//! Budgeting engine: normalization, the ledger store, metrics, trends and
//! debt simulation. Depends on kassa-domain. No CLI, no terminal I/O, no
//! direct file access (persistence goes through [`LedgerRepository`]).

pub mod debt_service;
pub mod display;
pub mod draft_service;
pub mod error;
pub mod ledger_service;
pub mod ledger_store;
pub mod metrics_service;
pub mod normalization_service;
pub mod storage;
pub mod time;
pub mod trend_service;

pub use debt_service::*;
pub use display::*;
pub use draft_service::*;
pub use error::CoreError;
pub use ledger_service::*;
pub use ledger_store::LedgerStore;
pub use metrics_service::*;
pub use normalization_service::*;
pub use storage::*;
pub use time::{Clock, FixedClock, SystemClock};
pub use trend_service::*;

#[cfg(test)]
mod tests;
