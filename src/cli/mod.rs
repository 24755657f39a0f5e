pub mod commands;
pub mod core;
pub mod output;
pub mod render;
pub mod shell;

pub use shell::run_cli;
