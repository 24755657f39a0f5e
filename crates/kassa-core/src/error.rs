use kassa_domain::{EntryKind, MonthKey};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("No data stored for month {0}")]
    MonthNotFound(MonthKey),
    #[error("No {kind} entry at position {index}")]
    EntryNotFound { kind: EntryKind, index: usize },
    #[error("Debt not found: {0}")]
    DebtNotFound(Uuid),
    #[error("Backup not found: {0}")]
    BackupNotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serde(err.to_string())
    }
}
