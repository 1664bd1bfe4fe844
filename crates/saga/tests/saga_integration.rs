//! Integration test: the saga consumes its own durable group and its
//! commands land back in the event store.

use std::sync::Arc;

use async_trait::async_trait;
use common::AggregateType;
use domain::{AccountService, OpenAccount, WalletCommand, WalletEvent, account, event_registers};
use event_store::{EventDecoder, EventSubscriber, InMemoryEventStore};
use saga::{CommandDispatchError, CommandSender, OpeningBalanceSaga, SagaConfig};
use subscriptions::{
    HandlerProvider, HandlerRegistry, HandlerType, Lifecycle, subscribe_for_sagas,
};
use tokio::time::{Duration, sleep, timeout};

/// Routes saga commands straight into the domain services.
struct ServiceCommandSender {
    accounts: AccountService<InMemoryEventStore>,
}

#[async_trait]
impl CommandSender for ServiceCommandSender {
    async fn send(&self, command: WalletCommand) -> Result<(), CommandDispatchError> {
        match command {
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
            WalletCommand::OpenAccount(cmd) => self
                .accounts
                .open_account(cmd)
                .await
                .map(|_| ())
                .map_err(Into::into),
            WalletCommand::CloseAccount(cmd) => self
                .accounts
                .close_account(cmd)
                .await
                .map(|_| ())
                .map_err(Into::into),
            WalletCommand::RegisterMovementType(_) => {
                Err("movement types are not dispatched here".into())
            }
        }
    }
}

#[tokio::test]
async fn opening_balance_becomes_a_recorded_deposit() {
    let store = InMemoryEventStore::new();

    let sender = Arc::new(ServiceCommandSender {
        accounts: AccountService::new(store.clone()),
    }) as Arc<dyn CommandSender>;
    let providers: Vec<Box<dyn HandlerProvider<WalletEvent>>> = vec![Box::new(SagaConfig::new(
        Arc::new(OpeningBalanceSaga::new()),
        sender,
    ))];
    let registry = HandlerRegistry::from_providers(providers.iter().map(|p| p.as_ref())).unwrap();

    let mut lifecycle = Lifecycle::new();
    subscribe_for_sagas(
        &AggregateType::from(account::AGGREGATE_TYPE),
        &HandlerType::for_saga("opening_balance"),
        Arc::new(store.clone()) as Arc<dyn EventSubscriber>,
        Arc::new(EventDecoder::from_registers(event_registers())),
        &registry,
        &mut lifecycle,
    )
    .await
    .unwrap();

    let service = AccountService::new(store.clone());
    let cmd = OpenAccount::new("Acme Bank", "checking", "EUR", 7_500);
    let account_id = cmd.account_id;
    service.open_account(cmd).await.unwrap();

    // The saga's deposit lands in the account stream; the aggregate balance
    // reflects it once applied.
    timeout(Duration::from_secs(2), async {
        loop {
            let account = service.get_account(account_id).await.unwrap();
            if account.is_some_and(|account| account.balance() == 7_500) {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("opening balance deposit never arrived");

    lifecycle.shutdown().await;
}
