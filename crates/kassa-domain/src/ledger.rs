//! Monthly ledger structures and the month-keyed history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{common::*, month::MonthKey};

/// One income or expense line, already normalized to a monthly base-currency amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub recurring: bool,
}

impl Entry {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            note: String::new(),
            recurring: false,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }
}

impl NamedEntity for Entry {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Amounted for Entry {
    fn amount(&self) -> f64 {
        self.amount
    }
}

/// Every income and expense entry recorded for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerMonth {
    pub key: MonthKey,
    pub incomes: Vec<Entry>,
    pub expenses: Vec<Entry>,
}

impl LedgerMonth {
    pub fn new(key: MonthKey) -> Self {
        Self {
            key,
            incomes: Vec::new(),
            expenses: Vec::new(),
        }
    }

    pub fn with_entries(key: MonthKey, incomes: Vec<Entry>, expenses: Vec<Entry>) -> Self {
        Self {
            key,
            incomes,
            expenses,
        }
    }

    pub fn entries(&self, kind: EntryKind) -> &[Entry] {
        match kind {
            EntryKind::Income => &self.incomes,
            EntryKind::Expense => &self.expenses,
        }
    }

    pub fn entries_mut(&mut self, kind: EntryKind) -> &mut Vec<Entry> {
        match kind {
            EntryKind::Income => &mut self.incomes,
            EntryKind::Expense => &mut self.expenses,
        }
    }

    pub fn total_income(&self) -> f64 {
        sum_amounts(&self.incomes)
    }

    pub fn total_expenses(&self) -> f64 {
        sum_amounts(&self.expenses)
    }

    pub fn is_empty(&self) -> bool {
        self.incomes.is_empty() && self.expenses.is_empty()
    }

    /// Removes entries whose amount is exactly zero; they count as "not entered".
    pub fn drop_zero_entries(&mut self) {
        self.incomes.retain(|entry| entry.amount != 0.0);
        self.expenses.retain(|entry| entry.amount != 0.0);
    }
}

pub fn sum_amounts<T: Amounted>(items: &[T]) -> f64 {
    items.iter().map(Amounted::amount).sum()
}

/// Persisted shape of a month: the key lives in the enclosing map.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthEntries {
    #[serde(default)]
    pub incomes: Vec<Entry>,
    #[serde(default)]
    pub expenses: Vec<Entry>,
}

/// All stored months, keyed and ordered by [`MonthKey`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<MonthKey, MonthEntries>",
    into = "BTreeMap<MonthKey, MonthEntries>"
)]
pub struct History {
    months: BTreeMap<MonthKey, LedgerMonth>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `month`, replacing any month with the same key. Zero-amount
    /// entries are dropped before storing.
    pub fn put(&mut self, mut month: LedgerMonth) {
        month.drop_zero_entries();
        self.months.insert(month.key, month);
    }

    pub fn get(&self, key: &MonthKey) -> Option<&LedgerMonth> {
        self.months.get(key)
    }

    pub fn latest(&self) -> Option<&LedgerMonth> {
        self.months.values().next_back()
    }

    pub fn keys_sorted(&self, order: SortOrder) -> Vec<MonthKey> {
        let keys = self.months.keys().copied();
        match order {
            SortOrder::Ascending => keys.collect(),
            SortOrder::Descending => keys.rev().collect(),
        }
    }

    /// Latest stored month strictly before `key`.
    pub fn previous_before(&self, key: &MonthKey) -> Option<&LedgerMonth> {
        self.months.range(..*key).next_back().map(|(_, month)| month)
    }

    /// The most recent `count` months, oldest first.
    pub fn recent(&self, count: usize) -> Vec<&LedgerMonth> {
        let mut recent: Vec<&LedgerMonth> = self.months.values().rev().take(count).collect();
        recent.reverse();
        recent
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerMonth> {
        self.months.values()
    }

    pub fn clear(&mut self) {
        self.months.clear();
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

impl From<BTreeMap<MonthKey, MonthEntries>> for History {
    fn from(raw: BTreeMap<MonthKey, MonthEntries>) -> Self {
        let mut history = History::new();
        for (key, entries) in raw {
            history.put(LedgerMonth::with_entries(key, entries.incomes, entries.expenses));
        }
        history
    }
}

impl From<History> for BTreeMap<MonthKey, MonthEntries> {
    fn from(history: History) -> Self {
        history
            .months
            .into_iter()
            .map(|(key, month)| {
                (
                    key,
                    MonthEntries {
                        incomes: month.incomes,
                        expenses: month.expenses,
                    },
                )
            })
            .collect()
    }
}

/// Monthly savings target in the base currency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SavingsGoal(f64);

impl SavingsGoal {
    /// Returns `None` for non-positive or non-finite targets.
    pub fn new(amount: f64) -> Option<Self> {
        if amount.is_finite() && amount > 0.0 {
            Some(Self(amount))
        } else {
            None
        }
    }

    pub fn amount(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> MonthKey {
        raw.parse().unwrap()
    }

    #[test]
    fn put_overwrites_and_drops_zero_entries() {
        let mut history = History::new();
        let mut month = LedgerMonth::new(key("2024-01"));
        month.incomes.push(Entry::new("Salary", 30000.0));
        month.expenses.push(Entry::new("Nothing", 0.0));
        history.put(month);

        let stored = history.get(&key("2024-01")).unwrap();
        assert_eq!(stored.incomes.len(), 1);
        assert!(stored.expenses.is_empty());

        history.put(LedgerMonth::new(key("2024-01")));
        assert!(history.get(&key("2024-01")).unwrap().is_empty());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn latest_uses_chronological_order_past_september() {
        let mut history = History::new();
        history.put(LedgerMonth::new(key("2024-9")));
        history.put(LedgerMonth::new(key("2024-10")));
        assert_eq!(history.latest().unwrap().key, key("2024-10"));
        assert_eq!(
            history.keys_sorted(SortOrder::Descending),
            vec![key("2024-10"), key("2024-09")]
        );
    }

    #[test]
    fn recent_returns_oldest_first() {
        let mut history = History::new();
        for raw in ["2024-01", "2024-02", "2024-03", "2024-04"] {
            history.put(LedgerMonth::new(key(raw)));
        }
        let keys: Vec<_> = history.recent(3).iter().map(|m| m.key).collect();
        assert_eq!(keys, vec![key("2024-02"), key("2024-03"), key("2024-04")]);
        assert_eq!(
            history.previous_before(&key("2024-03")).map(|m| m.key),
            Some(key("2024-02"))
        );
    }

    #[test]
    fn history_serializes_as_month_map() {
        let mut history = History::new();
        let mut month = LedgerMonth::new(key("2024-02"));
        month.expenses.push(Entry::new("Rent", 10000.0).recurring(true));
        history.put(month);

        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["2024-02"]["expenses"][0]["name"], "Rent");
        assert_eq!(json["2024-02"]["expenses"][0]["recurring"], true);

        let back: History = serde_json::from_value(json).unwrap();
        assert_eq!(back, history);
    }

    #[test]
    fn savings_goal_rejects_non_positive_values() {
        assert!(SavingsGoal::new(0.0).is_none());
        assert!(SavingsGoal::new(-5.0).is_none());
        assert!(SavingsGoal::new(f64::NAN).is_none());
        assert_eq!(SavingsGoal::new(2500.0).unwrap().amount(), 2500.0);
    }
}
