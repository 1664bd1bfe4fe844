//! Account balances read model.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{AccountEvent, AccountState, WalletEvent, account};
use event_store::DecodedEvent;
use subscriptions::{EventHandler, HandlerError, HandlerType};
use tokio::sync::RwLock;

use crate::error::ProjectionError;

/// Summary of one account in the balances view.
#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub account_id: AggregateId,
    pub bank_name: String,
    pub name: String,
    pub currency: String,
    /// Balance in minor units.
    pub balance: i64,
    pub state: AccountState,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read model view of every account and its current balance.
#[derive(Clone, Default)]
pub struct AccountBalancesView {
    accounts: Arc<RwLock<HashMap<AggregateId, AccountSummary>>>,
}

impl AccountBalancesView {
    /// Creates a new empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a summary of a specific account.
    pub async fn get_account(&self, account_id: AggregateId) -> Option<AccountSummary> {
        self.accounts.read().await.get(&account_id).cloned()
    }

    /// Gets all accounts.
    pub async fn all_accounts(&self) -> Vec<AccountSummary> {
        self.accounts.read().await.values().cloned().collect()
    }

    async fn apply(
        &self,
        event: &DecodedEvent<WalletEvent>,
        account_event: &AccountEvent,
    ) -> Result<(), ProjectionError> {
        let mut accounts = self.accounts.write().await;
        let account_id = event.aggregate_id;

        match account_event {
            AccountEvent::Opened(data) => {
                tracing::debug!(%account_id, name = %data.name, "account added to balances view");
                accounts.insert(
                    account_id,
                    AccountSummary {
                        account_id,
                        bank_name: data.bank_name.clone(),
                        name: data.name.clone(),
                        currency: data.currency.clone(),
                        balance: 0,
                        state: AccountState::Open,
                        opened_at: data.opened_at,
                        updated_at: event.timestamp,
                    },
                );
            }
            AccountEvent::Deposited(data) => {
                if let Some(summary) = accounts.get_mut(&account_id) {
                    summary.balance += data.amount;
                    summary.updated_at = event.timestamp;
                }
            }
            AccountEvent::Withdrawn(data) => {
                if let Some(summary) = accounts.get_mut(&account_id) {
                    summary.balance -= data.amount;
                    summary.updated_at = event.timestamp;
                }
            }
            AccountEvent::Closed(_) => {
                if let Some(summary) = accounts.get_mut(&account_id) {
                    summary.state = AccountState::Closed;
                    summary.updated_at = event.timestamp;
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl EventHandler<WalletEvent> for AccountBalancesView {
    fn handler_type(&self) -> HandlerType {
        HandlerType::from(account::AGGREGATE_TYPE)
    }

    async fn handle_event(&self, event: &DecodedEvent<WalletEvent>) -> Result<(), HandlerError> {
        let WalletEvent::Account(account_event) = &event.payload else {
            return Err(Box::new(ProjectionError::UnexpectedEvent {
                expected: account::AGGREGATE_TYPE,
                found: event.payload.event_type(),
            }));
        };

        self.apply(event, account_event).await?;
        metrics::counter!("projection_events_applied", "view" => "account_balances").increment(1);
        Ok(())
    }
}
