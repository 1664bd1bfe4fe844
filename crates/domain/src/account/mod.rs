//! Account aggregate and related types.

pub mod aggregate;
pub mod commands;
pub mod events;
pub mod service;

pub use aggregate::{AGGREGATE_TYPE, Account, AccountError, AccountState};
pub use commands::{CloseAccount, DepositFunds, OpenAccount, WithdrawFunds};
pub use events::{
    ACCOUNT_CLOSED, ACCOUNT_OPENED, AccountClosedData, AccountEvent, AccountOpenedData,
    FUNDS_DEPOSITED, FUNDS_WITHDRAWN, FundsDepositedData, FundsWithdrawnData, event_types,
};
pub use service::AccountService;
