//! Account commands.

use common::AggregateId;
use serde::{Deserialize, Serialize};

/// Opens a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAccount {
    pub account_id: AggregateId,
    pub bank_name: String,
    pub name: String,
    pub currency: String,
    /// Balance the account starts with, in minor units.
    pub starting_balance: i64,
}

impl OpenAccount {
    /// Creates the command with a fresh account ID.
    pub fn new(
        bank_name: impl Into<String>,
        name: impl Into<String>,
        currency: impl Into<String>,
        starting_balance: i64,
    ) -> Self {
        Self {
            account_id: AggregateId::new(),
            bank_name: bank_name.into(),
            name: name.into(),
            currency: currency.into(),
            starting_balance,
        }
    }
}

/// Records a deposit on an open account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositFunds {
    pub account_id: AggregateId,
    /// Amount in minor units; must be positive.
    pub amount: i64,
    pub description: String,
}

impl DepositFunds {
    pub fn new(account_id: AggregateId, amount: i64, description: impl Into<String>) -> Self {
        Self {
            account_id,
            amount,
            description: description.into(),
        }
    }
}

/// Records a withdrawal on an open account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawFunds {
    pub account_id: AggregateId,
    /// Amount in minor units; must be positive.
    pub amount: i64,
    pub description: String,
}

impl WithdrawFunds {
    pub fn new(account_id: AggregateId, amount: i64, description: impl Into<String>) -> Self {
        Self {
            account_id,
            amount,
            description: description.into(),
        }
    }
}

/// Closes an account with a zero balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseAccount {
    pub account_id: AggregateId,
}

impl CloseAccount {
    pub fn new(account_id: AggregateId) -> Self {
        Self { account_id }
    }
}
