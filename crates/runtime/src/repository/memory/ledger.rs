//! In-memory ledger implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use stealth_core::{EntityId, LedgerEntry};

use crate::repository::error::Result;
use crate::repository::{LedgerKey, LedgerRepository, RepositoryError};

/// In-memory ledger for testing and single-process hosts.
///
/// Thread-safe but not persistent across process restarts.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    transactions: RwLock<HashMap<LedgerKey, Vec<LedgerEntry>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerRepository for InMemoryLedger {
    fn entries(&self, key: &LedgerKey) -> Result<Vec<LedgerEntry>> {
        let transactions = self
            .transactions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        Ok(transactions.get(key).cloned().unwrap_or_default())
    }

    fn append(&self, key: &LedgerKey, entries: &[LedgerEntry]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut transactions = self
            .transactions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        transactions
            .entry(key.clone())
            .or_default()
            .extend_from_slice(entries);
        Ok(())
    }

    fn remove_entity(&self, key: &LedgerKey, entity: &EntityId) -> Result<Vec<LedgerEntry>> {
        let mut transactions = self
            .transactions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let Some(entries) = transactions.get_mut(key) else {
            return Ok(vec![]);
        };
        let (removed, kept): (Vec<_>, Vec<_>) = entries
            .drain(..)
            .partition(|entry| &entry.entity_id == entity);
        if kept.is_empty() {
            transactions.remove(key);
        } else {
            *entries = kept;
        }
        Ok(removed)
    }

    fn clear(&self, key: &LedgerKey) -> Result<()> {
        let mut transactions = self
            .transactions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        transactions.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<LedgerKey>> {
        let transactions = self
            .transactions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;

        let mut keys: Vec<LedgerKey> = transactions.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stealth_core::{ActionKind, PairRole, VisibilityState};

    fn entry(id: &str) -> LedgerEntry {
        LedgerEntry {
            entity_id: EntityId::new(id),
            role: PairRole::Observer,
            old_state: VisibilityState::Observed.into(),
        }
    }

    #[test]
    fn append_concatenates() {
        let ledger = InMemoryLedger::new();
        let key = LedgerKey::new("msg-1", ActionKind::Hide);
        ledger.append(&key, &[entry("a")]).unwrap();
        ledger.append(&key, &[entry("b"), entry("c")]).unwrap();

        let ids: Vec<_> = ledger
            .entries(&key)
            .unwrap()
            .into_iter()
            .map(|e| e.entity_id)
            .collect();
        assert_eq!(ids, vec![EntityId::new("a"), EntityId::new("b"), EntityId::new("c")]);
    }

    #[test]
    fn actions_on_one_message_are_isolated() {
        let ledger = InMemoryLedger::new();
        let hide = LedgerKey::new("msg-1", ActionKind::Hide);
        let sneak = LedgerKey::new("msg-1", ActionKind::Sneak);
        ledger.append(&hide, &[entry("a")]).unwrap();

        assert!(ledger.entries(&sneak).unwrap().is_empty());
        ledger.clear(&sneak).unwrap();
        assert_eq!(ledger.entries(&hide).unwrap().len(), 1);
    }

    #[test]
    fn remove_entity_keeps_the_rest() {
        let ledger = InMemoryLedger::new();
        let key = LedgerKey::new("msg-1", ActionKind::Seek);
        ledger
            .append(&key, &[entry("a"), entry("b"), entry("a")])
            .unwrap();

        let removed = ledger.remove_entity(&key, &EntityId::new("a")).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(ledger.entries(&key).unwrap(), vec![entry("b")]);

        ledger.remove_entity(&key, &EntityId::new("b")).unwrap();
        assert!(ledger.keys().unwrap().is_empty());
    }
}
