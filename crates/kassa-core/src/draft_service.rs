//! Editable month drafts: raw rows as typed, bounded undo/redo, auto-fill.

use std::collections::VecDeque;

use kassa_domain::{CurrencyCode, EntryKind, Frequency, LedgerMonth, MonthKey, RateTable};

use crate::{display::round2, normalization_service::NormalizationService};

/// Maximum number of undo snapshots kept per draft.
pub const MAX_HISTORY: usize = 50;

/// A row exactly as entered: amount in the display currency at `frequency`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub name: String,
    pub amount: f64,
    pub frequency: Frequency,
    pub note: String,
    pub recurring: bool,
}

impl RawEntry {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            frequency: Frequency::Monthly,
            note: String::new(),
            recurring: false,
        }
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
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

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub incomes: Vec<RawEntry>,
    pub expenses: Vec<RawEntry>,
}

impl Draft {
    pub fn rows(&self, kind: EntryKind) -> &[RawEntry] {
        match kind {
            EntryKind::Income => &self.incomes,
            EntryKind::Expense => &self.expenses,
        }
    }

    pub fn rows_mut(&mut self, kind: EntryKind) -> &mut Vec<RawEntry> {
        match kind {
            EntryKind::Income => &mut self.incomes,
            EntryKind::Expense => &mut self.expenses,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.incomes.is_empty() && self.expenses.is_empty()
    }

    /// Normalizes every row into a month ready to be stored under `key`.
    pub fn to_month(&self, key: MonthKey, currency: &CurrencyCode, rates: &RateTable) -> LedgerMonth {
        LedgerMonth::with_entries(
            key,
            NormalizationService::normalize_entries(&self.incomes, EntryKind::Income, currency, rates),
            NormalizationService::normalize_entries(
                &self.expenses,
                EntryKind::Expense,
                currency,
                rates,
            ),
        )
    }
}

/// Draft plus its undo and redo stacks.
#[derive(Debug, Clone, Default)]
pub struct DraftHistory {
    current: Draft,
    undo: VecDeque<Draft>,
    redo: Vec<Draft>,
}

impl DraftHistory {
    pub fn new(draft: Draft) -> Self {
        Self {
            current: draft,
            undo: VecDeque::new(),
            redo: Vec::new(),
        }
    }

    pub fn current(&self) -> &Draft {
        &self.current
    }

    /// Snapshots the current draft, then applies `change`. Clears redo.
    pub fn apply<F>(&mut self, change: F)
    where
        F: FnOnce(&mut Draft),
    {
        self.undo.push_back(self.current.clone());
        if self.undo.len() > MAX_HISTORY {
            self.undo.pop_front();
        }
        self.redo.clear();
        change(&mut self.current);
    }

    /// Replaces the draft wholesale as one undoable step.
    pub fn replace(&mut self, draft: Draft) {
        self.apply(|current| *current = draft);
    }

    pub fn undo(&mut self) -> bool {
        match self.undo.pop_back() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.current, previous);
                self.redo.push(current);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.current, next);
                self.undo.push_back(current);
                true
            }
            None => false,
        }
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }
}

pub struct DraftService;

impl DraftService {
    /// Builds a draft from a stored month, converting each amount into the
    /// display currency and rounding to cents.
    pub fn autofill(month: &LedgerMonth, currency: &CurrencyCode, rates: &RateTable) -> Draft {
        let rows = |kind: EntryKind| {
            month
                .entries(kind)
                .iter()
                .map(|entry| RawEntry {
                    name: entry.name.clone(),
                    amount: round2(rates.from_base(entry.amount, currency)),
                    frequency: Frequency::Monthly,
                    note: entry.note.clone(),
                    recurring: entry.recurring,
                })
                .collect()
        };
        Draft {
            incomes: rows(EntryKind::Income),
            expenses: rows(EntryKind::Expense),
        }
    }
}
