use std::{path::PathBuf, sync::Mutex};

use serde::{Deserialize, Serialize};

use kassa_domain::{Debt, History, SavingsGoal};

use crate::CoreError;

/// Version written by this build. Older documents are migrated on load.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything the application persists: month history, debts and the goal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub schema_version: u32,
    #[serde(default)]
    pub history: History,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub savings_goal: Option<SavingsGoal>,
}

impl StoreDocument {
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ..Self::default()
        }
    }
}

/// Describes a persisted backup artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupInfo {
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing the document and backups.
pub trait LedgerRepository: Send + Sync {
    /// Loads the stored document, or an empty one when nothing is stored yet.
    fn load_document(&self) -> Result<StoreDocument, CoreError>;
    fn save_document(&self, document: &StoreDocument) -> Result<(), CoreError>;
    fn backup(&self, note: Option<&str>) -> Result<BackupInfo, CoreError>;
    fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError>;
    fn restore_backup(&self, id: &str) -> Result<StoreDocument, CoreError>;
}

/// Keeps the document in memory; backups are snapshots in the same process.
#[derive(Debug)]
pub struct InMemoryRepository {
    document: Mutex<StoreDocument>,
    backups: Mutex<Vec<(BackupInfo, StoreDocument)>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            document: Mutex::new(StoreDocument::new()),
            backups: Mutex::new(Vec::new()),
        }
    }

    pub fn with_document(document: StoreDocument) -> Self {
        Self {
            document: Mutex::new(document),
            backups: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> CoreError {
    CoreError::Storage("in-memory repository lock poisoned".into())
}

impl LedgerRepository for InMemoryRepository {
    fn load_document(&self) -> Result<StoreDocument, CoreError> {
        Ok(self.document.lock().map_err(poisoned)?.clone())
    }

    fn save_document(&self, document: &StoreDocument) -> Result<(), CoreError> {
        *self.document.lock().map_err(poisoned)? = document.clone();
        Ok(())
    }

    fn backup(&self, note: Option<&str>) -> Result<BackupInfo, CoreError> {
        let snapshot = self.document.lock().map_err(poisoned)?.clone();
        let mut backups = self.backups.lock().map_err(poisoned)?;
        let mut id = format!("memory-{}", backups.len() + 1);
        if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
            id.push('-');
            id.push_str(note);
        }
        let info = BackupInfo {
            id: id.clone(),
            created_at: chrono::Utc::now().format("%Y-%m-%d %H:%M").to_string(),
            path: PathBuf::from(id),
        };
        backups.push((info.clone(), snapshot));
        Ok(info)
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError> {
        let backups = self.backups.lock().map_err(poisoned)?;
        Ok(backups.iter().rev().map(|(info, _)| info.clone()).collect())
    }

    fn restore_backup(&self, id: &str) -> Result<StoreDocument, CoreError> {
        let snapshot = {
            let backups = self.backups.lock().map_err(poisoned)?;
            backups
                .iter()
                .find(|(info, _)| info.id == id)
                .map(|(_, doc)| doc.clone())
                .ok_or_else(|| CoreError::BackupNotFound(id.to_string()))?
        };
        *self.document.lock().map_err(poisoned)? = snapshot.clone();
        Ok(snapshot)
    }
}
