use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use kassa_core::{
    storage::{BackupInfo, LedgerRepository, StoreDocument, SCHEMA_VERSION},
    CoreError,
};
use kassa_domain::{Debt, History, SavingsGoal};

const DOCUMENT_STEM: &str = "kassa";
const JSON_EXTENSION: &str = "json";
const BACKUP_DIR: &str = "backups";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

const LEGACY_HISTORY_KEY: &str = "budgetHistory";
const LEGACY_DEBTS_KEY: &str = "debts";
const LEGACY_GOAL_KEY: &str = "savingsGoal";

/// Filesystem-backed JSON persistence for the kassa document and its backups.
#[derive(Debug, Clone)]
pub struct JsonLedgerRepository {
    document_path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonLedgerRepository {
    /// Stores `kassa.json` and a `backups/` directory under `data_root`.
    pub fn new(data_root: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(data_root, DEFAULT_RETENTION)
    }

    pub fn with_retention(data_root: PathBuf, retention: usize) -> Result<Self, CoreError> {
        let backups_dir = data_root.join(BACKUP_DIR);
        fs::create_dir_all(&data_root)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            document_path: data_root.join(format!("{DOCUMENT_STEM}.{JSON_EXTENSION}")),
            backups_dir,
            retention: retention.max(1),
        })
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    pub fn backup_path(&self, id: &str) -> PathBuf {
        self.backups_dir.join(id)
    }

    /// Backups are named `kassa_YYYYMMDD_HHMM[-N][_note].json`. Within one
    /// minute `N` continues from the highest counter still on disk, so the
    /// newest backup always sorts first even after older ones were pruned.
    fn next_backup_path(&self, note: Option<&str>) -> Result<(String, PathBuf), CoreError> {
        let minute = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let latest = self
            .list_backups()?
            .iter()
            .filter_map(|info| backup_stamp(&info.id))
            .filter(|stamp| stamp.minute == minute)
            .map(|stamp| stamp.sequence)
            .max();
        let mut stem = match latest {
            Some(sequence) => format!("{DOCUMENT_STEM}_{minute}-{}", sequence + 1),
            None => format!("{DOCUMENT_STEM}_{minute}"),
        };
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let file_name = format!("{stem}.{JSON_EXTENSION}");
        let path = self.backups_dir.join(&file_name);
        Ok((file_name, path))
    }

    /// Copies the current document aside before it is overwritten.
    fn backup_existing_file(&self, note: Option<&str>) -> Result<Option<BackupInfo>, CoreError> {
        if !self.document_path.exists() {
            return Ok(None);
        }
        fs::create_dir_all(&self.backups_dir)?;
        let (id, path) = self.next_backup_path(note)?;
        fs::copy(&self.document_path, &path)?;
        self.prune_backups()?;
        Ok(Some(BackupInfo {
            created_at: backup_created_at(&id),
            id,
            path,
        }))
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        let entries = self.list_backups()?;
        for entry in entries.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(backup = %entry.id, error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }

    fn write_document(&self, document: &StoreDocument) -> Result<(), CoreError> {
        save_document_to_path(document, &self.document_path)
    }
}

impl LedgerRepository for JsonLedgerRepository {
    fn load_document(&self) -> Result<StoreDocument, CoreError> {
        if !self.document_path.exists() {
            return Ok(StoreDocument::new());
        }
        let raw: Value = serde_json::from_str(&fs::read_to_string(&self.document_path)?)?;
        let migrating = document_schema(&raw) < SCHEMA_VERSION;
        let document = document_from_value(raw)?;
        if migrating {
            self.backup_existing_file(Some("pre-migration"))?;
            self.write_document(&document)?;
            info!(
                path = %self.document_path.display(),
                months = document.history.len(),
                "migrated legacy document"
            );
        }
        Ok(document)
    }

    fn save_document(&self, document: &StoreDocument) -> Result<(), CoreError> {
        self.backup_existing_file(None)?;
        self.write_document(document)
    }

    fn backup(&self, note: Option<&str>) -> Result<BackupInfo, CoreError> {
        if !self.document_path.exists() {
            self.write_document(&StoreDocument::new())?;
        }
        self.backup_existing_file(note)?
            .ok_or_else(|| CoreError::Storage("nothing to back up".into()))
    }

    fn list_backups(&self) -> Result<Vec<BackupInfo>, CoreError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(JSON_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(BackupInfo {
                    id: file_name.to_string(),
                    created_at: backup_created_at(file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| {
            Reverse(backup_stamp(&info.id).map(|stamp| (stamp.taken_at, stamp.sequence)))
        });
        Ok(entries)
    }

    fn restore_backup(&self, id: &str) -> Result<StoreDocument, CoreError> {
        let source = self.backup_path(id);
        if !source.exists() {
            return Err(CoreError::BackupNotFound(id.to_string()));
        }
        let document = load_document_from_path(&source)?;
        self.write_document(&document)?;
        info!(backup = %id, "document restored from backup");
        Ok(document)
    }
}

/// Saves a document to an arbitrary path on disk (tmp file + rename).
pub fn save_document_to_path(document: &StoreDocument, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serde_json::to_string_pretty(document)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a document from `path`, upgrading older schemas in memory.
pub fn load_document_from_path(path: &Path) -> Result<StoreDocument, CoreError> {
    let raw: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    document_from_value(raw)
}

/// Schema declared by a raw document; documents without one are schema 0.
fn document_schema(raw: &Value) -> u32 {
    raw.get("schema_version")
        .and_then(Value::as_u64)
        .map(|version| version as u32)
        .unwrap_or(0)
}

fn document_from_value(raw: Value) -> Result<StoreDocument, CoreError> {
    match document_schema(&raw) {
        0 => migrate_legacy(raw),
        SCHEMA_VERSION => Ok(serde_json::from_value(raw)?),
        newer => Err(CoreError::Storage(format!(
            "document schema {newer} is newer than supported schema {SCHEMA_VERSION}"
        ))),
    }
}

/// Upgrades a browser-storage export (`budgetHistory`, `debts`, `savingsGoal`,
/// values possibly JSON-encoded strings) to the current schema.
fn migrate_legacy(raw: Value) -> Result<StoreDocument, CoreError> {
    let history: History = match legacy_field(&raw, LEGACY_HISTORY_KEY)? {
        Some(value) => serde_json::from_value(value)?,
        None => History::new(),
    };
    let debts: Vec<Debt> = match legacy_field(&raw, LEGACY_DEBTS_KEY)? {
        Some(value) => serde_json::from_value(value)?,
        None => Vec::new(),
    };
    let savings_goal = legacy_field(&raw, LEGACY_GOAL_KEY)?
        .and_then(|value| match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        })
        .and_then(SavingsGoal::new);

    Ok(StoreDocument {
        schema_version: SCHEMA_VERSION,
        history,
        debts,
        savings_goal,
    })
}

/// Reads `key`, decoding string values that hold JSON. Null and empty fields
/// count as absent.
fn legacy_field(raw: &Value, key: &str) -> Result<Option<Value>, CoreError> {
    match raw.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) if key != LEGACY_GOAL_KEY => {
            Ok(Some(serde_json::from_str(text)?))
        }
        Some(value) => Ok(Some(value.clone())),
    }
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Timestamp and same-minute counter decoded from a backup file name.
#[derive(Debug, PartialEq)]
struct BackupStamp {
    minute: String,
    taken_at: DateTime<Utc>,
    sequence: u32,
}

/// Parses `kassa_YYYYMMDD_HHMM[-N][_note].json`. The counter is read only
/// from the time segment; notes never contain `_`.
fn backup_stamp(name: &str) -> Option<BackupStamp> {
    let stem = name
        .strip_suffix(&format!(".{JSON_EXTENSION}"))?
        .strip_prefix(&format!("{DOCUMENT_STEM}_"))?;
    let mut segments = stem.splitn(3, '_');
    let date = segments.next()?;
    let time_segment = segments.next()?;
    let (time, sequence) = match time_segment.split_once('-') {
        Some((time, counter)) if counter.chars().all(|c| c.is_ascii_digit()) => {
            (time, counter.parse().ok()?)
        }
        Some(_) => return None,
        None => (time_segment, 1),
    };
    if !is_digits(date, 8) || !is_digits(time, 4) {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M").ok()?;
    Some(BackupStamp {
        minute: format!("{date}_{time}"),
        taken_at: DateTime::from_naive_utc_and_offset(naive, Utc),
        sequence,
    })
}

fn backup_created_at(name: &str) -> String {
    backup_stamp(name)
        .map(|stamp| stamp.taken_at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| name.to_string())
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
