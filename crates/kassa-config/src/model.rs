use serde::{de::Deserializer, Deserialize, Serialize};
use std::{fmt, path::PathBuf};

use kassa_domain::{CurrencyCode, PaymentStrategy};

use crate::ConfigError;

pub const DEFAULT_RATES_URL: &str =
    "https://api.exchangerate.host/latest?base=SEK&symbols=USD,EUR,JPY,GBP";

/// Stores user-configurable preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Currency amounts are entered and shown in.
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default)]
    pub lang: Language,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub debt_strategy: PaymentStrategy,
    #[serde(default = "Config::default_rates_url")]
    pub rates_url: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the ledger document and its backups.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::base(),
            lang: Language::default(),
            theme: Theme::default(),
            debt_strategy: PaymentStrategy::default(),
            rates_url: Self::default_rates_url(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_rates_url() -> String {
        DEFAULT_RATES_URL.into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    /// Directory holding `kassa.json`; defaults to the platform data dir.
    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("kassa")
    }

    /// Updates one preference from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            reason,
        };
        match key {
            "currency" => {
                let code = CurrencyCode::new(value);
                if code.as_str().len() != 3 || !code.as_str().chars().all(|c| c.is_ascii_alphabetic())
                {
                    return Err(invalid("expected a three-letter currency code".into()));
                }
                self.currency = code;
            }
            "lang" => self.lang = Language::parse(value).ok_or_else(|| invalid("use en, sv or ja".into()))?,
            "theme" => {
                self.theme = Theme::parse(value)
                    .ok_or_else(|| invalid("use dark-minimal or light-minimal".into()))?
            }
            "debt_strategy" => self.debt_strategy = value.parse().map_err(invalid)?,
            "rates_url" => {
                let url = value.trim();
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(invalid("expected an http(s) URL".into()));
                }
                self.rates_url = url.to_string();
            }
            "ui_color_enabled" => {
                self.ui_color_enabled = match value.trim().to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid("expected on or off".into())),
                }
            }
            "data_root" => {
                let trimmed = value.trim();
                self.data_root = if trimmed.is_empty() || trimmed == "default" {
                    None
                } else {
                    Some(PathBuf::from(trimmed))
                };
            }
            other => {
                return Err(ConfigError::InvalidValue {
                    key: other.to_string(),
                    reason: "unknown setting".into(),
                })
            }
        }
        Ok(())
    }

    pub const KEYS: [&'static str; 7] = [
        "currency",
        "lang",
        "theme",
        "debt_strategy",
        "rates_url",
        "ui_color_enabled",
        "data_root",
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    DarkMinimal,
    LightMinimal,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark-minimal" | "dark" => Some(Theme::DarkMinimal),
            "light-minimal" | "light" => Some(Theme::LightMinimal),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Theme::DarkMinimal => "dark-minimal",
            Theme::LightMinimal => "light-minimal",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().and_then(Theme::parse).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Sv,
    Ja,
}

impl Language {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Language::En),
            "sv" | "swedish" | "svenska" => Some(Language::Sv),
            "ja" | "japanese" => Some(Language::Ja),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Language::En => "en",
            Language::Sv => "sv",
            Language::Ja => "ja",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().and_then(Language::parse).unwrap_or_default())
    }
}
