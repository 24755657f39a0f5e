//! kassa-domain
//!
//! Pure domain models (Entry, LedgerMonth, History, Debt, rate tables).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod common;
pub mod debt;
pub mod ledger;
pub mod month;
pub mod rates;

pub use common::*;
pub use debt::*;
pub use ledger::*;
pub use month::*;
pub use rates::*;
