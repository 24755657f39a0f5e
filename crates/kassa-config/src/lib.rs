//! kassa-config
//!
//! Persistent user preferences: display currency, language, theme, debt
//! payment strategy, rate endpoint and data location.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{Config, Language, Theme};
