//! Loading, saving and backing up `config.json`.
//!
//! Backups are named `config_YYYYMMDD_HHMM[-N][_note].json`; `N` counts
//! backups taken within the same minute and only ever grows, so the newest
//! backup always lists first.

use std::{
    cmp::Reverse,
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{NaiveDateTime, Utc};

use crate::{Config, ConfigError};

const CONFIG_FILE: &str = "config.json";
const BACKUP_PREFIX: &str = "config";
const BACKUP_EXTENSION: &str = "json";
const MINUTE_FORMAT: &str = "%Y%m%d_%H%M";
const PRE_RESTORE_NOTE: &str = "pre-restore";

/// Configuration backups kept on disk.
pub const CONFIG_BACKUP_RETENTION: usize = 10;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
            retention: CONFIG_BACKUP_RETENTION,
        }
    }

    /// `<base>/config/config.json` with backups in `<base>/config/backups/`.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        let backups_dir = config_dir.join("backups");
        fs::create_dir_all(&backups_dir)?;
        Ok(Self::new(config_dir.join(CONFIG_FILE), backups_dir))
    }

    /// Platform config directory (`~/.config/kassa` on Linux).
    pub fn with_default_location() -> Result<Self, ConfigError> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kassa");
        Self::with_base_dir(base)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Defaults when no file has been written yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match fs::read_to_string(&self.config_path) {
            Ok(data) => parse_config(&data, &self.config_path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        write_config(&self.config_path, config)
    }

    /// Writes `config` as a new backup and returns its file name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, ConfigError> {
        let name = self.next_backup_name(note)?;
        write_config(&self.backups_dir.join(&name), config)?;
        self.prune()?;
        Ok(name)
    }

    /// Makes a backup the active configuration. The configuration it replaces
    /// is kept as a `pre-restore` backup.
    pub fn restore(&self, backup_name: &str) -> Result<Config, ConfigError> {
        let path = self.backups_dir.join(backup_name);
        let data = fs::read_to_string(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ConfigError::BackupNotFound(backup_name.to_string()),
            _ => ConfigError::Io(err),
        })?;
        let restored = parse_config(&data, &path)?;

        if self.config_path.exists() {
            // An unreadable current file is simply replaced.
            if let Ok(current) = self.load() {
                self.backup(&current, Some(PRE_RESTORE_NOTE))?;
            }
        }
        self.save(&restored)?;
        Ok(restored)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, ConfigError> {
        let mut stamped = Vec::new();
        let entries = match fs::read_dir(&self.backups_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if let Some(stamp) = BackupStamp::parse(&name) {
                stamped.push((stamp, name));
            }
        }
        stamped.sort_by_key(|(stamp, _)| Reverse((stamp.taken_at, stamp.sequence)));
        Ok(stamped.into_iter().map(|(_, name)| name).collect())
    }

    fn next_backup_name(&self, note: Option<&str>) -> Result<String, ConfigError> {
        let minute = Utc::now().format(MINUTE_FORMAT).to_string();
        let latest = self
            .list_backups()?
            .iter()
            .filter_map(|name| BackupStamp::parse(name))
            .filter(|stamp| stamp.minute == minute)
            .map(|stamp| stamp.sequence)
            .max();

        let mut name = format!("{BACKUP_PREFIX}_{minute}");
        if let Some(sequence) = latest {
            name.push_str(&format!("-{}", sequence + 1));
        }
        if let Some(slug) = note_slug(note) {
            name.push('_');
            name.push_str(&slug);
        }
        name.push_str(&format!(".{BACKUP_EXTENSION}"));
        Ok(name)
    }

    fn prune(&self) -> Result<(), ConfigError> {
        for name in self.list_backups()?.into_iter().skip(self.retention) {
            fs::remove_file(self.backups_dir.join(name))?;
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
struct BackupStamp {
    minute: String,
    taken_at: NaiveDateTime,
    sequence: u32,
}

impl BackupStamp {
    fn parse(name: &str) -> Option<Self> {
        let stem = name
            .strip_suffix(&format!(".{BACKUP_EXTENSION}"))?
            .strip_prefix(&format!("{BACKUP_PREFIX}_"))?;
        let mut segments = stem.splitn(3, '_');
        let date = segments.next()?;
        let time_segment = segments.next()?;
        let (time, sequence) = match time_segment.split_once('-') {
            Some((time, counter)) => (time, counter.parse().ok()?),
            None => (time_segment, 1),
        };
        if date.len() != 8 || time.len() != 4 {
            return None;
        }
        let taken_at = NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M").ok()?;
        Some(Self {
            minute: format!("{date}_{time}"),
            taken_at,
            sequence,
        })
    }
}

/// Lowercase alphanumeric words joined by `-`; never contains `_`.
fn note_slug(note: Option<&str>) -> Option<String> {
    let slug = note?
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    (!slug.is_empty()).then_some(slug)
}

fn parse_config(data: &str, path: &Path) -> Result<Config, ConfigError> {
    serde_json::from_str(data)
        .map_err(|err| ConfigError::Serde(format!("{}: {err}", path.display())))
}

/// Pretty JSON through a sibling tmp file and a rename.
fn write_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json =
        serde_json::to_string_pretty(config).map_err(|err| ConfigError::Serde(err.to_string()))?;
    let tmp = path.with_extension(format!("{BACKUP_EXTENSION}.tmp"));
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
