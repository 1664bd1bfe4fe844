//! Opening balance saga.
//!
//! Reacts to account openings: a positive starting balance becomes an
//! explicit deposit, so the opening balance shows up in the movement history
//! like any other credit.

use async_trait::async_trait;
use domain::{AccountEvent, DepositFunds, WalletCommand, WalletEvent, account};
use event_store::DecodedEvent;
use subscriptions::EventMatcher;

use crate::error::SagaError;
use crate::saga::{CommandSender, Saga};

pub const SAGA_NAME: &str = "opening_balance";

const OPENING_BALANCE_DESCRIPTION: &str = "opening balance";

/// Records each account's starting balance as its first deposit.
#[derive(Default)]
pub struct OpeningBalanceSaga;

impl OpeningBalanceSaga {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Saga for OpeningBalanceSaga {
    fn name(&self) -> &'static str {
        SAGA_NAME
    }

    fn matcher(&self) -> EventMatcher {
        EventMatcher::for_events([account::ACCOUNT_OPENED])
    }

    async fn run_saga(
        &self,
        event: &DecodedEvent<WalletEvent>,
        commands: &dyn CommandSender,
    ) -> Result<(), SagaError> {
        let WalletEvent::Account(AccountEvent::Opened(data)) = &event.payload else {
            return Err(SagaError::UnexpectedEvent {
                expected: account::ACCOUNT_OPENED,
                found: event.payload.event_type(),
            });
        };

        if data.starting_balance <= 0 {
            return Ok(());
        }

        tracing::info!(
            account_id = %data.account_id,
            amount = data.starting_balance,
            "recording opening balance as a deposit"
        );

        commands
            .send(WalletCommand::DepositFunds(DepositFunds::new(
                data.account_id,
                data.starting_balance,
                OPENING_BALANCE_DESCRIPTION,
            )))
            .await
            .map_err(SagaError::CommandDispatch)
    }
}
