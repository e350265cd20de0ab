//! SQLite storage implementation for the paper trading ledger.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The `LedgerStoreTrait` implementation
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!   core (domain)
//!        │
//!        ▼
//! storage-sqlite (this crate)
//!        │
//!        ▼
//!    SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod ledger;
pub mod schema;

// Re-export database utilities
pub use db::{create_pool, get_connection, init, open, run_migrations, DbConnection, DbPool};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use ledger::SqliteLedgerStore;

// Re-export from papertrade-core for convenience
pub use papertrade_core::errors::{DatabaseError, Error, Result};
