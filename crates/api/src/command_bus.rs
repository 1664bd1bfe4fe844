//! Routes saga-issued commands into the domain services.

use async_trait::async_trait;
use domain::{AccountService, MovementTypeService, WalletCommand};
use event_store::{EventReader, EventWriter};
use saga::{CommandDispatchError, CommandSender};

/// In-process command bus: each command variant lands on its service.
pub struct ServiceCommandBus<S: EventWriter + EventReader> {
    accounts: AccountService<S>,
    movement_types: MovementTypeService<S>,
}

impl<S: EventWriter + EventReader + Clone> ServiceCommandBus<S> {
    pub fn new(store: S) -> Self {
        Self {
            accounts: AccountService::new(store.clone()),
            movement_types: MovementTypeService::new(store),
        }
    }
}

#[async_trait]
impl<S: EventWriter + EventReader> CommandSender for ServiceCommandBus<S> {
    async fn send(&self, command: WalletCommand) -> Result<(), CommandDispatchError> {
        match command {
            WalletCommand::OpenAccount(cmd) => self
                .accounts
                .open_account(cmd)
                .await
                .map(|_| ())
                .map_err(Into::into),
            WalletCommand::DepositFunds(cmd) => self
                .accounts
                .deposit_funds(cmd)
                .await
                .map(|_| ())
                .map_err(Into::into),
            WalletCommand::WithdrawFunds(cmd) => self
                .accounts
                .withdraw_funds(cmd)
                .await
                .map(|_| ())
                .map_err(Into::into),
            WalletCommand::CloseAccount(cmd) => self
                .accounts
                .close_account(cmd)
                .await
                .map(|_| ())
                .map_err(Into::into),
            WalletCommand::RegisterMovementType(cmd) => self
                .movement_types
                .register(cmd)
                .await
                .map(|_| ())
                .map_err(Into::into),
        }
    }
}
