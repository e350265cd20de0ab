//! JSON file storage for the paper trading ledger.
//!
//! The whole ledger is kept in a single pretty-printed JSON document. Saves
//! write a sibling temporary file, sync it and rename it over the target, so
//! readers only ever see a complete document.
//!
//! ```text
//! core (LedgerStoreTrait)
//!          │
//!          ▼
//!   storage-json (this crate)
//!          │
//!          ▼
//!   papertrading_store.json
//! ```

pub mod errors;
pub mod store;

pub use errors::StorageError;
pub use store::JsonFileLedgerStore;

// Re-export from papertrade-core for convenience
pub use papertrade_core::errors::{DatabaseError, Error, Result};
