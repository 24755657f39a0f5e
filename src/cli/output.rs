use colored::{Color, Colorize};
use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use kassa_config::Theme;
use kassa_domain::CurrencyCode;

static LIGHT_THEME: AtomicBool = AtomicBool::new(false);

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

pub fn set_color_enabled(enabled: bool) {
    if enabled {
        colored::control::unset_override();
    } else {
        colored::control::set_override(false);
    }
}

/// Selects the palette used for every following message.
pub fn set_theme(theme: Theme) {
    LIGHT_THEME.store(theme == Theme::LightMinimal, Ordering::Relaxed);
}

fn current_theme() -> Theme {
    if LIGHT_THEME.load(Ordering::Relaxed) {
        Theme::LightMinimal
    } else {
        Theme::DarkMinimal
    }
}

/// Bright tones read well on dark backgrounds; light backgrounds get the
/// plain ones.
fn tint(kind: MessageKind, theme: Theme) -> Option<Color> {
    let light = theme == Theme::LightMinimal;
    match kind {
        MessageKind::Success => Some(if light { Color::Green } else { Color::BrightGreen }),
        MessageKind::Warning => Some(if light { Color::Yellow } else { Color::BrightYellow }),
        MessageKind::Error => Some(if light { Color::Red } else { Color::BrightRed }),
        MessageKind::Section => light.then_some(Color::Blue),
        MessageKind::Info | MessageKind::Hint => None,
    }
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "",
        MessageKind::Success => "[ok] ",
        MessageKind::Warning => "[!] ",
        MessageKind::Error => "[x] ",
        MessageKind::Hint => "hint: ",
        MessageKind::Section => "",
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => format!("{}{}", label(kind), text),
    };

    let mut styled = formatted.normal();
    if let Some(color) = tint(kind, current_theme()) {
        styled = styled.color(color);
    }
    match kind {
        MessageKind::Hint => styled.dimmed().to_string(),
        MessageKind::Section => styled.bold().to_string(),
        _ => styled.to_string(),
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// `1234.50 kr`-style amount; the value is expected to be display-rounded.
pub fn money(amount: f64, currency: &CurrencyCode) -> String {
    format!("{amount:.2} {}", currency.symbol())
}
