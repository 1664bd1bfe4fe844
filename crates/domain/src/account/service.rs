//! Account service providing a simplified API for account operations.

use common::AggregateId;
use event_store::{EventReader, EventWriter};

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::aggregate::Account;
use super::commands::{CloseAccount, DepositFunds, OpenAccount, WithdrawFunds};

/// Service for managing accounts.
///
/// Wraps the command handler with one method per command.
pub struct AccountService<S: EventWriter + EventReader> {
    handler: CommandHandler<S, Account>,
}

impl<S: EventWriter + EventReader> AccountService<S> {
    /// Creates a new account service with the given store client.
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    /// Opens a new account.
    #[tracing::instrument(skip(self))]
    pub async fn open_account(&self, cmd: OpenAccount) -> Result<CommandResult<Account>, DomainError> {
        self.handler
            .execute(cmd.account_id, |account| account.open(&cmd))
            .await
    }

    /// Records a deposit.
    #[tracing::instrument(skip(self))]
    pub async fn deposit_funds(
        &self,
        cmd: DepositFunds,
    ) -> Result<CommandResult<Account>, DomainError> {
        self.handler
            .execute(cmd.account_id, |account| {
                account.deposit(cmd.amount, cmd.description.clone())
            })
            .await
    }

    /// Records a withdrawal.
    #[tracing::instrument(skip(self))]
    pub async fn withdraw_funds(
        &self,
        cmd: WithdrawFunds,
    ) -> Result<CommandResult<Account>, DomainError> {
        self.handler
            .execute(cmd.account_id, |account| {
                account.withdraw(cmd.amount, cmd.description.clone())
            })
            .await
    }

    /// Closes an account.
    #[tracing::instrument(skip(self))]
    pub async fn close_account(
        &self,
        cmd: CloseAccount,
    ) -> Result<CommandResult<Account>, DomainError> {
        self.handler
            .execute(cmd.account_id, |account| account.close())
            .await
    }

    /// Loads an account by ID, returning None if it doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_account(&self, account_id: AggregateId) -> Result<Option<Account>, DomainError> {
        self.handler.load_existing(account_id).await
    }
}
