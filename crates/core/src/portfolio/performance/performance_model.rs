use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::Account;

/// Current cash balance and holdings of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub balance: Decimal,
    pub positions: BTreeMap<String, u64>,
}

impl From<&Account> for PerformanceSnapshot {
    fn from(account: &Account) -> Self {
        Self {
            balance: account.balance,
            positions: account.positions.clone(),
        }
    }
}
