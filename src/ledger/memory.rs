//! An in-memory `LedgerView`, good enough to exercise full handlers
//! end-to-end in tests, grounded in the teacher's in-memory test-fake style
//! (`host/host_bindings_for_testing.rs`).

use crate::ledger::{LedgerEntry, LedgerError, LedgerResult, LedgerView};
use crate::types::hash::Hash256;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerView {
    entries: BTreeMap<Hash256, LedgerEntry>,
}

impl InMemoryLedgerView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LedgerView for InMemoryLedgerView {
    fn exists(&self, key: Hash256) -> bool {
        self.entries.contains_key(&key)
    }

    fn read(&self, key: Hash256) -> LedgerResult<LedgerEntry> {
        self.entries.get(&key).cloned().ok_or(LedgerError::NotFound)
    }

    fn insert(&mut self, key: Hash256, entry: LedgerEntry) -> LedgerResult<()> {
        if self.entries.contains_key(&key) {
            return Err(LedgerError::AlreadyExists);
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    fn update(&mut self, key: Hash256, entry: LedgerEntry) -> LedgerResult<()> {
        if !self.entries.contains_key(&key) {
            return Err(LedgerError::NotFound);
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    fn erase(&mut self, key: Hash256) -> LedgerResult<()> {
        if self.entries.remove(&key).is_none() {
            return Err(LedgerError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entries::{AccountRoot, LedgerEntry};
    use crate::types::account_id::AccountID;

    fn account_entry(account: AccountID) -> LedgerEntry {
        LedgerEntry::AccountRoot(AccountRoot {
            account,
            balance: 0,
            owner_count: 0,
            sequence: 1,
            flags: 0,
            minted_nftokens: 0,
            burned_nftokens: 0,
            nftoken_minter: None,
            transfer_rate: 1_000_000_000,
        })
    }

    #[test]
    fn insert_then_read_round_trips() {
        let mut view = InMemoryLedgerView::new();
        let key = Hash256::from([1u8; 32]);
        view.insert(key, account_entry(AccountID::ZERO)).unwrap();
        assert!(view.exists(key));
        assert!(view.read(key).is_ok());
    }

    #[test]
    fn insert_twice_fails() {
        let mut view = InMemoryLedgerView::new();
        let key = Hash256::from([2u8; 32]);
        view.insert(key, account_entry(AccountID::ZERO)).unwrap();
        assert_eq!(
            view.insert(key, account_entry(AccountID::ZERO)),
            Err(LedgerError::AlreadyExists)
        );
    }

    #[test]
    fn update_of_absent_key_fails() {
        let mut view = InMemoryLedgerView::new();
        let key = Hash256::from([3u8; 32]);
        assert_eq!(
            view.update(key, account_entry(AccountID::ZERO)),
            Err(LedgerError::NotFound)
        );
    }

    #[test]
    fn erase_removes_entry() {
        let mut view = InMemoryLedgerView::new();
        let key = Hash256::from([4u8; 32]);
        view.insert(key, account_entry(AccountID::ZERO)).unwrap();
        view.erase(key).unwrap();
        assert!(!view.exists(key));
        assert_eq!(view.erase(key), Err(LedgerError::NotFound));
    }
}
