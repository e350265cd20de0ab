use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use super::ledger_model::Ledger;
use super::ledger_traits::LedgerStoreTrait;
use crate::errors::{Error, Result};

/// Ledger store that lives only in memory.
///
/// Used for tests and for servers started without persistence. It counts
/// saves so callers can check that read paths never write.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    ledger: RwLock<Ledger>,
    saves: AtomicUsize,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl LedgerStoreTrait for InMemoryLedgerStore {
    fn load(&self) -> Result<Ledger> {
        let guard = self
            .ledger
            .read()
            .map_err(|_| Error::Unexpected("In-memory ledger lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let mut guard = self
            .ledger
            .write()
            .map_err(|_| Error::Unexpected("In-memory ledger lock poisoned".to_string()))?;
        *guard = ledger.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
