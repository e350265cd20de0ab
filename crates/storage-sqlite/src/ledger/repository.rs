use std::sync::Arc;

use chrono::Utc;
use diesel::prelude::*;
use log::{debug, error};
use papertrade_core::ledger::{Ledger, LedgerStoreTrait};
use papertrade_core::Result;

use super::model::LedgerAccountDB;
use crate::db::{get_connection, DbPool};
use crate::errors::{IntoCore, StorageError};
use crate::schema::ledger_accounts;

// Keeps each INSERT well under SQLite's bound-parameter limit
const INSERT_BATCH_SIZE: usize = 100;

/// Ledger store backed by the `ledger_accounts` table.
///
/// `save` replaces every row inside one immediate transaction, so readers on
/// other connections see either the previous or the new ledger.
pub struct SqliteLedgerStore {
    pool: Arc<DbPool>,
}

impl SqliteLedgerStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl LedgerStoreTrait for SqliteLedgerStore {
    fn load(&self) -> Result<Ledger> {
        let mut conn = get_connection(&self.pool)?;
        let rows = ledger_accounts::table
            .select(LedgerAccountDB::as_select())
            .load::<LedgerAccountDB>(&mut conn)
            .into_core()?;

        let mut ledger = Ledger::new();
        for row in rows {
            let (user_id, account) = row.into_account().map_err(|e| {
                error!("Ledger table is unreadable: {}", e);
                e
            })?;
            ledger.insert(user_id, account);
        }
        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let now = Utc::now().naive_utc();
        let rows = ledger
            .iter()
            .map(|(user_id, account)| LedgerAccountDB::from_account(user_id, account, now))
            .collect::<std::result::Result<Vec<_>, StorageError>>()
            .into_core()?;

        let mut conn = get_connection(&self.pool)?;
        conn.immediate_transaction::<_, StorageError, _>(|c| {
            diesel::delete(ledger_accounts::table).execute(c)?;
            for batch in rows.chunks(INSERT_BATCH_SIZE) {
                diesel::insert_into(ledger_accounts::table)
                    .values(batch)
                    .execute(c)?;
            }
            Ok(())
        })
        .into_core()?;

        debug!("Saved {} accounts to the ledger table", rows.len());
        Ok(())
    }
}
