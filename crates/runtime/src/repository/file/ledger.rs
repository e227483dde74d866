//! File-based ledger implementation.
//!
//! One JSON document per transaction:
//!
//! ```text
//! {base_dir}/
//!   ├── ledger_hide_msg-1.json
//!   └── ledger_point_out_msg_2f7.json
//! ```
//!
//! Writes go to a temp file first and are moved into place with a rename.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stealth_core::{EntityId, LedgerEntry};

use crate::repository::error::Result;
use crate::repository::{LedgerKey, LedgerRepository, RepositoryError};

#[derive(Debug, Serialize, Deserialize)]
struct LedgerDocument {
    key: LedgerKey,
    entries: Vec<LedgerEntry>,
}

/// File-based implementation of [`LedgerRepository`].
///
/// Survives process restarts, so a revert can still find the entries of a
/// chat message applied in an earlier session.
pub struct FileLedger {
    base_dir: PathBuf,
}

impl FileLedger {
    /// Create a ledger rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    /// Platform data directory for the ledger.
    ///
    /// - Linux: `~/.local/share/stealth/ledger`
    /// - macOS: `~/Library/Application Support/stealth/ledger`
    /// - Windows: `%APPDATA%\stealth\ledger`
    /// - Fallback: `./stealth_data/ledger`
    pub fn default_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "stealth")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./stealth_data"))
            .join("ledger")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn ledger_path(&self, key: &LedgerKey) -> PathBuf {
        self.base_dir.join(format!(
            "ledger_{}_{}.json",
            key.action.as_snake_case(),
            encode_component(&key.message_id)
        ))
    }

    fn read(&self, key: &LedgerKey) -> Result<Vec<LedgerEntry>> {
        let path = self.ledger_path(key);
        if !path.exists() {
            return Ok(vec![]);
        }
        let document = read_document(&path)?;
        if &document.key != key {
            return Err(RepositoryError::CorruptedData(format!(
                "{} holds entries for {}",
                path.display(),
                document.key
            )));
        }
        Ok(document.entries)
    }

    fn write(&self, key: &LedgerKey, entries: Vec<LedgerEntry>) -> Result<()> {
        let path = self.ledger_path(key);
        if entries.is_empty() {
            return self.remove_file(&path);
        }

        let temp_path = path.with_extension("json.tmp");
        let document = LedgerDocument {
            key: key.clone(),
            entries,
        };

        // Write to temp file
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| RepositoryError::Json(e.to_string()))?;
        fs::write(&temp_path, json).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!(
            "Saved {} ledger entries: {}",
            document.entries.len(),
            path.display()
        );
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path).map_err(RepositoryError::Io)?;
            tracing::debug!("Deleted ledger: {}", path.display());
        }
        Ok(())
    }
}

impl LedgerRepository for FileLedger {
    fn entries(&self, key: &LedgerKey) -> Result<Vec<LedgerEntry>> {
        self.read(key)
    }

    fn append(&self, key: &LedgerKey, entries: &[LedgerEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut existing = self.read(key)?;
        existing.extend_from_slice(entries);
        self.write(key, existing)
    }

    fn remove_entity(&self, key: &LedgerKey, entity: &EntityId) -> Result<Vec<LedgerEntry>> {
        let existing = self.read(key)?;
        let (removed, kept): (Vec<_>, Vec<_>) = existing
            .into_iter()
            .partition(|entry| &entry.entity_id == entity);
        if !removed.is_empty() {
            self.write(key, kept)?;
        }
        Ok(removed)
    }

    fn clear(&self, key: &LedgerKey) -> Result<()> {
        self.remove_file(&self.ledger_path(key))
    }

    fn keys(&self) -> Result<Vec<LedgerKey>> {
        let mut keys = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;
        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && filename.starts_with("ledger_")
                && filename.ends_with(".json")
            {
                keys.push(read_document(&path)?.key);
            }
        }

        keys.sort();
        Ok(keys)
    }
}

fn read_document(path: &Path) -> Result<LedgerDocument> {
    let json = fs::read_to_string(path).map_err(RepositoryError::Io)?;
    serde_json::from_str(&json).map_err(|e| RepositoryError::Json(e.to_string()))
}

/// Maps a message id onto a file-name-safe string without collisions.
///
/// ASCII alphanumerics and `-` pass through; every other byte becomes `_xx`.
fn encode_component(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("_{byte:02x}"));
        }
    }
    encoded
}
