//! Wallet domain layer: aggregates, commands, and events.
//!
//! Two aggregates make up the ledger:
//! - [`account::Account`] — a bank account with an explicit movement history
//! - [`movement_type::MovementType`] — a registered category of movements
//!
//! [`WalletEvent`] is the decoded-event sum type the subscription engine
//! routes, and [`event_registers`] feeds the decoder table.

pub mod account;
pub mod aggregate;
pub mod command;
pub mod commands;
pub mod error;
pub mod events;
pub mod movement_type;

pub use account::{
    Account, AccountError, AccountEvent, AccountService, AccountState, CloseAccount, DepositFunds,
    OpenAccount, WithdrawFunds,
};
pub use aggregate::{Aggregate, DomainEvent, EventDecodeError};
pub use command::{CommandHandler, CommandResult};
pub use commands::WalletCommand;
pub use error::DomainError;
pub use events::{WalletEvent, event_registers};
pub use movement_type::{
    MovementDirection, MovementType, MovementTypeError, MovementTypeEvent, MovementTypeService,
    RegisterMovementType,
};
