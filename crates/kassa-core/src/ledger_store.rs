//! Month-keyed ledger store persisted through a [`LedgerRepository`].

use tracing::info;
use uuid::Uuid;

use kassa_domain::{
    CurrencyCode, Debt, Entry, EntryKind, History, LedgerMonth, MonthKey, RateTable,
    SavingsGoal, SortOrder,
};

use crate::{
    debt_service::DebtService,
    ledger_service::{EntryEdit, LedgerService},
    storage::{BackupInfo, InMemoryRepository, LedgerRepository, StoreDocument},
    CoreError,
};

/// Owns the loaded document and writes it back after every mutation.
pub struct LedgerStore {
    repository: Box<dyn LedgerRepository>,
    document: StoreDocument,
}

impl LedgerStore {
    pub fn open(repository: Box<dyn LedgerRepository>) -> Result<Self, CoreError> {
        let document = repository.load_document()?;
        info!(
            months = document.history.len(),
            debts = document.debts.len(),
            "ledger store opened"
        );
        Ok(Self {
            repository,
            document,
        })
    }

    /// Store backed by an [`InMemoryRepository`]; nothing touches disk.
    pub fn in_memory() -> Self {
        Self {
            repository: Box::new(InMemoryRepository::new()),
            document: StoreDocument::new(),
        }
    }

    pub fn document(&self) -> &StoreDocument {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.document.history
    }

    fn persist(&self) -> Result<(), CoreError> {
        self.repository.save_document(&self.document)
    }

    /// Stores `month`, overwriting any month with the same key.
    pub fn put(&mut self, month: LedgerMonth) -> Result<(), CoreError> {
        let key = month.key;
        self.document.history.put(month);
        self.persist()?;
        info!(month = %key, "month saved");
        Ok(())
    }

    pub fn get(&self, key: &MonthKey) -> Option<&LedgerMonth> {
        self.document.history.get(key)
    }

    pub fn latest(&self) -> Option<&LedgerMonth> {
        self.document.history.latest()
    }

    pub fn keys_sorted(&self, order: SortOrder) -> Vec<MonthKey> {
        self.document.history.keys_sorted(order)
    }

    /// Removes every stored month. Debts and the goal are kept.
    pub fn clear_all(&mut self) -> Result<(), CoreError> {
        self.document.history.clear();
        self.persist()?;
        info!("month history cleared");
        Ok(())
    }

    fn month_copy(&self, key: &MonthKey) -> Result<LedgerMonth, CoreError> {
        self.get(key).cloned().ok_or(CoreError::MonthNotFound(*key))
    }

    /// Applies a review edit to a stored month and saves it under the same key.
    pub fn edit_entry(
        &mut self,
        key: &MonthKey,
        kind: EntryKind,
        index: usize,
        edit: EntryEdit,
        currency: &CurrencyCode,
        rates: &RateTable,
    ) -> Result<(), CoreError> {
        let mut month = self.month_copy(key)?;
        LedgerService::edit_entry(&mut month, kind, index, edit, currency, rates)?;
        self.put(month)
    }

    pub fn remove_entry(
        &mut self,
        key: &MonthKey,
        kind: EntryKind,
        index: usize,
    ) -> Result<Entry, CoreError> {
        let mut month = self.month_copy(key)?;
        let removed = LedgerService::remove_entry(&mut month, kind, index)?;
        self.put(month)?;
        Ok(removed)
    }

    /// Merges one duplicate group inside a stored month.
    pub fn merge_duplicates(
        &mut self,
        key: &MonthKey,
        kind: EntryKind,
        group: &[usize],
    ) -> Result<(), CoreError> {
        let mut month = self.month_copy(key)?;
        LedgerService::merge_group(month.entries_mut(kind), group)?;
        self.put(month)
    }

    pub fn debts(&self) -> &[Debt] {
        &self.document.debts
    }

    pub fn add_debt(&mut self, debt: Debt) -> Result<Uuid, CoreError> {
        DebtService::validate(&debt)?;
        let id = debt.id;
        self.document.debts.push(debt);
        self.persist()?;
        info!(debt = %id, "debt added");
        Ok(id)
    }

    pub fn remove_debt(&mut self, id: Uuid) -> Result<Debt, CoreError> {
        let position = self
            .document
            .debts
            .iter()
            .position(|debt| debt.id == id)
            .ok_or(CoreError::DebtNotFound(id))?;
        let removed = self.document.debts.remove(position);
        self.persist()?;
        info!(debt = %id, "debt removed");
        Ok(removed)
    }

    pub fn goal(&self) -> Option<SavingsGoal> {
        self.document.savings_goal
    }

    pub fn set_goal(&mut self, amount: f64) -> Result<SavingsGoal, CoreError> {
        let goal = SavingsGoal::new(amount).ok_or_else(|| {
            CoreError::Validation("savings goal must be a positive amount".into())
        })?;
        self.document.savings_goal = Some(goal);
        self.persist()?;
        Ok(goal)
    }

    pub fn clear_goal(&mut self) -> Result<(), CoreError> {
        self.document.savings_goal = None;
        self.persist()
    }

    pub fn backup(&self, note: Option<&str>) -> Result<BackupInfo, CoreError> {
        let info = self.repository.backup(note)?;
        info!(backup = %info.id, "backup created");
        Ok(info)
    }

    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError> {
        self.repository.list_backups()
    }

    /// Replaces the loaded document with the named backup.
    pub fn restore_backup(&mut self, id: &str) -> Result<(), CoreError> {
        self.document = self.repository.restore_backup(id)?;
        info!(backup = %id, "backup restored");
        Ok(())
    }

    /// Replaces the whole document (e.g. from an exported file). The current
    /// document is backed up first with a `pre-import` note.
    pub fn import_document(&mut self, document: StoreDocument) -> Result<BackupInfo, CoreError> {
        let backup = self.repository.backup(Some("pre-import"))?;
        self.document = document;
        self.persist()?;
        info!(
            months = self.document.history.len(),
            backup = %backup.id,
            "document imported"
        );
        Ok(backup)
    }
}
