use kassa_config::{Config, Language, Theme};
use kassa_core::DisplayConverter;
use kassa_domain::{CurrencyCode, PaymentStrategy, RateTable};

/// Snapshot of everything a report depends on besides the stored ledger.
/// Never mutated in place; `with_*` returns an updated copy.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub currency: CurrencyCode,
    /// Carried for the rendering side; the terminal shell prints English and
    /// only refetches rates when it changes.
    pub lang: Language,
    /// Picks the message palette of the terminal output.
    pub theme: Theme,
    pub rates: RateTable,
    pub strategy: PaymentStrategy,
}

impl AppState {
    pub fn from_config(config: &Config, rates: RateTable) -> Self {
        Self {
            currency: config.currency.clone(),
            lang: config.lang,
            theme: config.theme,
            rates,
            strategy: config.debt_strategy,
        }
    }

    pub fn with_currency(&self, currency: CurrencyCode) -> Self {
        Self {
            currency,
            ..self.clone()
        }
    }

    pub fn with_rates(&self, rates: RateTable) -> Self {
        Self {
            rates,
            ..self.clone()
        }
    }

    pub fn with_lang(&self, lang: Language) -> Self {
        Self {
            lang,
            ..self.clone()
        }
    }

    pub fn with_theme(&self, theme: Theme) -> Self {
        Self {
            theme,
            ..self.clone()
        }
    }

    pub fn with_strategy(&self, strategy: PaymentStrategy) -> Self {
        Self {
            strategy,
            ..self.clone()
        }
    }

    pub fn converter(&self) -> DisplayConverter<'_> {
        DisplayConverter::new(&self.currency, &self.rates)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&Config::default(), RateTable::fallback())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_methods_leave_the_original_untouched() {
        let state = AppState::default();
        let usd = state.with_currency(CurrencyCode::new("USD"));
        assert!(state.currency.is_base());
        assert_eq!(usd.currency.as_str(), "USD");
        assert_eq!(usd.rates, state.rates);

        let rollover = usd.with_strategy(PaymentStrategy::Rollover);
        assert_eq!(usd.strategy, PaymentStrategy::MinimumOnly);
        assert_eq!(rollover.strategy, PaymentStrategy::Rollover);
    }

    #[test]
    fn converter_uses_state_currency() {
        let state = AppState::default().with_currency(CurrencyCode::new("USD"));
        assert_eq!(state.converter().to_display(1000.0), 94.0);
    }
}
