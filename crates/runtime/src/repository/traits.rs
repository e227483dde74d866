//! Repository contract for the message-scoped ledger.

use std::fmt;

use serde::{Deserialize, Serialize};
use stealth_core::{ActionKind, EntityId, LedgerEntry};

use super::error::Result;

/// Transaction key: the chat message that carried the action, plus the action.
///
/// Two different actions recorded against the same message never share
/// entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LedgerKey {
    pub message_id: String,
    pub action: ActionKind,
}

impl LedgerKey {
    pub fn new(message_id: impl Into<String>, action: ActionKind) -> Self {
        Self {
            message_id: message_id.into(),
            action,
        }
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.message_id, self.action)
    }
}

/// Storage for the undo records of applied transactions.
///
/// Entries for a key grow by concatenation and shrink by per-entity or full
/// removal. Missing keys read as empty.
pub trait LedgerRepository: Send + Sync {
    /// All entries recorded under `key`, oldest first.
    fn entries(&self, key: &LedgerKey) -> Result<Vec<LedgerEntry>>;

    /// Appends `entries` after any existing ones.
    fn append(&self, key: &LedgerKey, entries: &[LedgerEntry]) -> Result<()>;

    /// Removes every entry naming `entity` and returns them.
    fn remove_entity(&self, key: &LedgerKey, entity: &EntityId) -> Result<Vec<LedgerEntry>>;

    /// Drops the whole transaction.
    fn clear(&self, key: &LedgerKey) -> Result<()>;

    /// Keys that currently hold entries.
    fn keys(&self) -> Result<Vec<LedgerKey>> {
        Ok(vec![])
    }

    fn contains(&self, key: &LedgerKey) -> Result<bool> {
        Ok(!self.entries(key)?.is_empty())
    }
}
