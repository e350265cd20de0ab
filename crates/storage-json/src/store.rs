use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, error};
use papertrade_core::ledger::{parse_ledger, Ledger, LedgerStoreTrait};
use papertrade_core::Result;
use tempfile::NamedTempFile;

use crate::errors::StorageError;

/// Ledger store backed by a single JSON document on disk.
///
/// A missing file reads as an empty ledger. Any file that exists but does not
/// parse, including a zero-byte one, is reported as `StoreCorrupted` and is
/// never overwritten by a load.
#[derive(Debug)]
pub struct JsonFileLedgerStore {
    path: PathBuf,
    // Serializes saves within the process
    lock: Mutex<()>,
}

impl JsonFileLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn read(&self) -> std::result::Result<Option<Vec<u8>>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn replace(&self, ledger: &Ledger) -> std::result::Result<(), StorageError> {
        let dir = self.parent_dir();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Write {
            path: dir.clone(),
            source,
        })?;

        let document = serde_json::to_vec_pretty(ledger)?;
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        let mut temp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        temp.write_all(&document).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&self.path)
            .map_err(|source| StorageError::Persist {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }
}

impl LedgerStoreTrait for JsonFileLedgerStore {
    // Reads take no lock: `save` swaps the file in with a rename, so a reader
    // sees either the old document or the new one.
    fn load(&self) -> Result<Ledger> {
        let Some(bytes) = self.read()? else {
            debug!("No ledger at {}, starting empty", self.path.display());
            return Ok(Ledger::new());
        };

        parse_ledger(&bytes).map_err(|e| {
            error!("Ledger at {} is unreadable: {}", self.path.display(), e);
            e.into()
        })
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        self.replace(ledger)?;
        debug!(
            "Saved {} accounts to {}",
            ledger.len(),
            self.path.display()
        );
        Ok(())
    }
}
