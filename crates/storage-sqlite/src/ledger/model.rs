//! Database model for ledger accounts.

use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use papertrade_core::ledger::{Account, LedgerError};
use rust_decimal::Decimal;

use crate::errors::StorageError;

/// One account row. Positions and trades are stored as JSON text and the
/// balance as a decimal string so no precision is lost.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::ledger_accounts)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LedgerAccountDB {
    pub user_id: String,
    pub balance: String,
    pub positions: String,
    pub trades: String,
    pub updated_at: NaiveDateTime,
}

impl LedgerAccountDB {
    pub fn from_account(
        user_id: &str,
        account: &Account,
        updated_at: NaiveDateTime,
    ) -> Result<Self, StorageError> {
        Ok(Self {
            user_id: user_id.to_string(),
            balance: account.balance.to_string(),
            positions: serde_json::to_string(&account.positions)?,
            trades: serde_json::to_string(&account.trades)?,
            updated_at,
        })
    }

    /// Decodes the row. Any column that does not parse means the store is corrupted.
    pub fn into_account(self) -> Result<(String, Account), LedgerError> {
        let corrupted = |column: &str, detail: String| {
            LedgerError::StoreCorrupted(format!(
                "account '{}' has an unreadable {} column: {}",
                self.user_id, column, detail
            ))
        };

        let balance =
            Decimal::from_str(&self.balance).map_err(|e| corrupted("balance", e.to_string()))?;
        let positions = serde_json::from_str(&self.positions)
            .map_err(|e| corrupted("positions", e.to_string()))?;
        let trades =
            serde_json::from_str(&self.trades).map_err(|e| corrupted("trades", e.to_string()))?;

        let account = Account {
            balance,
            trades,
            positions,
        };
        account.validate(&self.user_id)?;
        Ok((self.user_id, account))
    }
}
