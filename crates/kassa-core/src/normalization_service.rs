//! Turns user-entered amounts into canonical monthly base-currency amounts.

use kassa_domain::{CurrencyCode, Entry, EntryKind, Frequency, RateTable};
use tracing::warn;

use crate::draft_service::RawEntry;

pub struct NormalizationService;

impl NormalizationService {
    /// Parses a user-typed amount. Anything non-numeric, non-finite or
    /// negative becomes 0; a single `,` is accepted as decimal separator.
    pub fn coerce_amount(input: &str) -> f64 {
        let cleaned: String = input.trim().chars().filter(|c| !c.is_whitespace()).collect();
        if cleaned.is_empty() {
            return 0.0;
        }
        let candidate = if cleaned.contains('.') {
            cleaned
        } else {
            cleaned.replacen(',', ".", 1)
        };
        match candidate.parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => value,
            _ => 0.0,
        }
    }

    /// Scales a per-period amount to a monthly amount.
    pub fn monthly_amount(amount: f64, frequency: Frequency) -> f64 {
        match frequency {
            Frequency::Weekly => amount * 52.0 / 12.0,
            Frequency::BiWeekly => amount * 26.0 / 12.0,
            Frequency::Monthly => amount,
            Frequency::Yearly => amount / 12.0,
        }
    }

    /// Monthly amount in the base currency for a raw entry.
    pub fn normalize(
        raw_amount: f64,
        frequency: Frequency,
        source: &CurrencyCode,
        rates: &RateTable,
    ) -> f64 {
        let monthly = Self::monthly_amount(raw_amount, frequency);
        if *source != rates.base && rates.rate(source).is_none() {
            warn!(currency = %source, "no usable exchange rate; treating amount as base currency");
        }
        rates.to_base(monthly, source)
    }

    /// Normalizes a list of raw rows into ledger entries, dropping rows whose
    /// normalized amount is exactly zero.
    pub fn normalize_entries(
        raw: &[RawEntry],
        kind: EntryKind,
        source: &CurrencyCode,
        rates: &RateTable,
    ) -> Vec<Entry> {
        raw.iter()
            .filter_map(|row| {
                let amount = Self::normalize(row.amount.max(0.0), row.frequency, source, rates);
                if amount == 0.0 {
                    return None;
                }
                let name = row.name.trim();
                let name = if name.is_empty() {
                    kind.default_name()
                } else {
                    name
                };
                Some(Entry {
                    name: name.to_string(),
                    amount,
                    note: row.note.trim().to_string(),
                    recurring: kind == EntryKind::Expense && row.recurring,
                })
            })
            .collect()
    }
}
