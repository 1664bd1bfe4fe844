//! Account aggregate state machine.

use chrono::{DateTime, Utc};
use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::Aggregate;

use super::commands::OpenAccount;
use super::events::{
    AccountClosedData, AccountEvent, AccountOpenedData, FundsDepositedData, FundsWithdrawnData,
};

pub const AGGREGATE_TYPE: &str = "account";

/// Lifecycle state of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountState {
    /// No opening event applied yet.
    #[default]
    NotOpened,

    /// Open and accepting movements.
    Open,

    /// Closed; terminal.
    Closed,
}

impl std::fmt::Display for AccountState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AccountState::NotOpened => "NotOpened",
            AccountState::Open => "Open",
            AccountState::Closed => "Closed",
        };
        write!(f, "{name}")
    }
}

/// Errors from account command handling.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account already opened")]
    AlreadyOpened,

    #[error("account not opened")]
    NotOpened,

    #[error("account is closed")]
    AccountClosed,

    #[error("movement amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("starting balance must not be negative, got {0}")]
    NegativeStartingBalance(i64),

    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },

    #[error("account balance must be zero to close, found {0}")]
    NonZeroBalance(i64),
}

/// A bank account rebuilt from its event stream.
#[derive(Debug, Clone, Default)]
pub struct Account {
    id: Option<AggregateId>,
    bank_name: String,
    name: String,
    currency: String,
    balance: i64,
    state: AccountState,
    opened_at: Option<DateTime<Utc>>,
    version: Version,
}

impl Account {
    /// Decides the opening of the account.
    pub fn open(&self, cmd: &OpenAccount) -> Result<Vec<AccountEvent>, AccountError> {
        if self.state != AccountState::NotOpened {
            return Err(AccountError::AlreadyOpened);
        }
        if cmd.starting_balance < 0 {
            return Err(AccountError::NegativeStartingBalance(cmd.starting_balance));
        }

        Ok(vec![AccountEvent::Opened(AccountOpenedData {
            account_id: cmd.account_id,
            bank_name: cmd.bank_name.clone(),
            name: cmd.name.clone(),
            currency: cmd.currency.clone(),
            starting_balance: cmd.starting_balance,
            opened_at: Utc::now(),
        })])
    }

    /// Decides a deposit.
    pub fn deposit(
        &self,
        amount: i64,
        description: impl Into<String>,
    ) -> Result<Vec<AccountEvent>, AccountError> {
        self.require_open()?;
        if amount <= 0 {
            return Err(AccountError::InvalidAmount(amount));
        }

        Ok(vec![AccountEvent::Deposited(FundsDepositedData {
            amount,
            description: description.into(),
            deposited_at: Utc::now(),
        })])
    }

    /// Decides a withdrawal. Overdrafts are rejected.
    pub fn withdraw(
        &self,
        amount: i64,
        description: impl Into<String>,
    ) -> Result<Vec<AccountEvent>, AccountError> {
        self.require_open()?;
        if amount <= 0 {
            return Err(AccountError::InvalidAmount(amount));
        }
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                balance: self.balance,
                requested: amount,
            });
        }

        Ok(vec![AccountEvent::Withdrawn(FundsWithdrawnData {
            amount,
            description: description.into(),
            withdrawn_at: Utc::now(),
        })])
    }

    /// Decides the closing of the account. Only a settled account closes.
    pub fn close(&self) -> Result<Vec<AccountEvent>, AccountError> {
        self.require_open()?;
        if self.balance != 0 {
            return Err(AccountError::NonZeroBalance(self.balance));
        }

        Ok(vec![AccountEvent::Closed(AccountClosedData {
            closed_at: Utc::now(),
        })])
    }

    fn require_open(&self) -> Result<(), AccountError> {
        match self.state {
            AccountState::NotOpened => Err(AccountError::NotOpened),
            AccountState::Closed => Err(AccountError::AccountClosed),
            AccountState::Open => Ok(()),
        }
    }

    pub fn state(&self) -> AccountState {
        self.state
    }

    /// Balance in minor units.
    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn bank_name(&self) -> &str {
        &self.bank_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.opened_at
    }
}

impl Aggregate for Account {
    type Event = AccountEvent;
    type Error = AccountError;

    fn aggregate_type() -> &'static str {
        AGGREGATE_TYPE
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: AccountEvent) {
        match event {
            AccountEvent::Opened(data) => {
                self.id = Some(data.account_id);
                self.bank_name = data.bank_name;
                self.name = data.name;
                self.currency = data.currency;
                self.balance = 0;
                self.state = AccountState::Open;
                self.opened_at = Some(data.opened_at);
            }
            AccountEvent::Deposited(data) => {
                self.balance += data.amount;
            }
            AccountEvent::Withdrawn(data) => {
                self.balance -= data.amount;
            }
            AccountEvent::Closed(_) => {
                self.state = AccountState::Closed;
            }
        }
    }
}
