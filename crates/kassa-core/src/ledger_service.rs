//! Entry-level operations on a month: duplicate merging and review edits.

use kassa_domain::{CurrencyCode, Entry, EntryKind, LedgerMonth, RateTable};

use crate::CoreError;

/// Changes applied to one entry during review. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryEdit {
    pub name: Option<String>,
    /// New amount in the display currency.
    pub amount: Option<f64>,
    pub note: Option<String>,
}

/// Provides duplicate detection and edit helpers for [`LedgerMonth`] entries.
pub struct LedgerService;

impl LedgerService {
    /// Index groups of entries sharing a case-insensitive name, ordered by
    /// first occurrence. Only groups with two or more members are returned.
    pub fn find_duplicate_groups(entries: &[Entry]) -> Vec<Vec<usize>> {
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            let key = entry.name.to_lowercase();
            match groups.iter_mut().find(|(name, _)| *name == key) {
                Some((_, members)) => members.push(index),
                None => groups.push((key, vec![index])),
            }
        }
        groups
            .into_iter()
            .map(|(_, members)| members)
            .filter(|members| members.len() > 1)
            .collect()
    }

    /// Folds every entry of `group` into the first one: amounts are summed and
    /// non-empty notes joined with `"; "`. The remaining members are removed.
    pub fn merge_group(entries: &mut Vec<Entry>, group: &[usize]) -> Result<(), CoreError> {
        let mut sorted = group.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let Some((&first, rest)) = sorted.split_first() else {
            return Ok(());
        };
        if let Some(&bad) = sorted.iter().find(|&&index| index >= entries.len()) {
            return Err(CoreError::Validation(format!(
                "merge index {bad} is out of range"
            )));
        }

        let total: f64 = sorted.iter().map(|&index| entries[index].amount).sum();
        let note = sorted
            .iter()
            .map(|&index| entries[index].note.trim())
            .filter(|note| !note.is_empty())
            .collect::<Vec<_>>()
            .join("; ");

        entries[first].amount = total;
        entries[first].note = note;
        for &index in rest.iter().rev() {
            entries.remove(index);
        }
        Ok(())
    }

    /// Merges every duplicate group; returns how many groups were merged.
    pub fn merge_all_duplicates(entries: &mut Vec<Entry>) -> Result<usize, CoreError> {
        let mut merged = 0;
        while let Some(group) = Self::find_duplicate_groups(entries).into_iter().next() {
            Self::merge_group(entries, &group)?;
            merged += 1;
        }
        Ok(merged)
    }

    /// Applies a review edit. A blank name keeps the old one, the amount is
    /// converted from `currency` back to the base, and the note is trimmed.
    pub fn edit_entry(
        month: &mut LedgerMonth,
        kind: EntryKind,
        index: usize,
        edit: EntryEdit,
        currency: &CurrencyCode,
        rates: &RateTable,
    ) -> Result<(), CoreError> {
        let entry = month
            .entries_mut(kind)
            .get_mut(index)
            .ok_or(CoreError::EntryNotFound { kind, index })?;
        if let Some(name) = edit.name {
            let name = name.trim();
            if !name.is_empty() {
                entry.name = name.to_string();
            }
        }
        if let Some(amount) = edit.amount {
            let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
            entry.amount = rates.to_base(amount, currency);
        }
        if let Some(note) = edit.note {
            entry.note = note.trim().to_string();
        }
        Ok(())
    }

    pub fn remove_entry(
        month: &mut LedgerMonth,
        kind: EntryKind,
        index: usize,
    ) -> Result<Entry, CoreError> {
        let entries = month.entries_mut(kind);
        if index >= entries.len() {
            return Err(CoreError::EntryNotFound { kind, index });
        }
        Ok(entries.remove(index))
    }
}
