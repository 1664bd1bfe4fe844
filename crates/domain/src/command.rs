//! Command handling against the log-store boundary.

use std::marker::PhantomData;

use common::AggregateId;
use event_store::{AppendOptions, EventReader, EventWriter, ProposedEvent, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were generated and persisted.
    pub events: Vec<A::Event>,

    /// The new version of the aggregate after the command.
    pub new_version: Version,
}

/// Executes commands against one aggregate type.
///
/// The handler loads the aggregate by replaying its stream, runs the command
/// function to produce events, and appends them with the loaded version as
/// the optimistic-concurrency expectation.
pub struct CommandHandler<S, A>
where
    S: EventWriter + EventReader,
    A: Aggregate,
{
    store: S,
    _phantom: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventWriter + EventReader,
    A: Aggregate,
{
    /// Creates a new command handler with the given store client.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying store client.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn stream_id(aggregate_id: AggregateId) -> String {
        format!("{}-{}", A::aggregate_type(), aggregate_id)
    }

    /// Loads an aggregate by replaying its stream.
    ///
    /// An aggregate with no events comes back as the default instance.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        let events = self.store.read_stream(&Self::stream_id(aggregate_id)).await?;

        let mut aggregate = A::default();
        for recorded in events {
            let event = A::Event::decode(&recorded.event_type, &recorded.data)?;
            aggregate.apply(event);
            aggregate.set_version(Version::new(recorded.position as i64 + 1));
        }

        Ok(aggregate)
    }

    /// Loads an aggregate, returning None if it doesn't exist.
    pub async fn load_existing(&self, aggregate_id: AggregateId) -> Result<Option<A>, DomainError> {
        let aggregate = self.load(aggregate_id).await?;
        if aggregate.id().is_some() {
            Ok(Some(aggregate))
        } else {
            Ok(None)
        }
    }

    /// Executes a command and persists the resulting events.
    ///
    /// The command function receives the current aggregate state and returns
    /// either a list of events to apply, or a domain rule violation.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let mut aggregate = self.load(aggregate_id).await?;
        let current_version = aggregate.version();

        let events = command_fn(&aggregate)?;
        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events: vec![],
                new_version: current_version,
            });
        }

        let mut proposed = Vec::with_capacity(events.len());
        for event in &events {
            proposed.push(ProposedEvent::new(event.event_type(), event.encode()?));
        }

        let new_version = self
            .store
            .append_to_stream(
                &Self::stream_id(aggregate_id),
                AppendOptions::expect_version(current_version),
                proposed,
            )
            .await?;

        for event in &events {
            aggregate.apply(event.clone());
        }
        aggregate.set_version(new_version);

        Ok(CommandResult {
            aggregate,
            events,
            new_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountError, OpenAccount};
    use event_store::{EventStoreError, InMemoryEventStore};

    fn open_command() -> OpenAccount {
        OpenAccount::new("Acme Bank", "checking", "EUR", 0)
    }

    #[tokio::test]
    async fn execute_creates_the_aggregate() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Account> = CommandHandler::new(store);
        let cmd = open_command();
        let account_id = cmd.account_id;

        let result = handler
            .execute(account_id, |account| account.open(&cmd))
            .await
            .unwrap();

        assert_eq!(result.events.len(), 1);
        assert_eq!(result.new_version, Version::first());
        assert_eq!(result.aggregate.id(), Some(account_id));
    }

    #[tokio::test]
    async fn load_replays_the_stream() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Account> = CommandHandler::new(store);
        let cmd = open_command();
        let account_id = cmd.account_id;

        handler
            .execute(account_id, |account| account.open(&cmd))
            .await
            .unwrap();
        handler
            .execute(account_id, |account| account.deposit(500, "salary"))
            .await
            .unwrap();

        let account = handler.load(account_id).await.unwrap();
        assert_eq!(account.balance(), 500);
        assert_eq!(account.version(), Version::new(2));
    }

    #[tokio::test]
    async fn load_existing_returns_none_for_unknown_id() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Account> = CommandHandler::new(store);

        let result = handler.load_existing(AggregateId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn rule_violation_persists_nothing() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Account> = CommandHandler::new(store.clone());
        let account_id = AggregateId::new();

        let result = handler
            .execute(account_id, |account| account.deposit(100, "salary"))
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Account(AccountError::NotOpened))
        ));
        assert_eq!(store.event_count().await, 0);
    }

    #[tokio::test]
    async fn stale_expected_version_is_a_concurrency_conflict() {
        let store = InMemoryEventStore::new();
        let handler: CommandHandler<_, Account> = CommandHandler::new(store.clone());
        let cmd = open_command();
        let account_id = cmd.account_id;

        handler
            .execute(account_id, |account| account.open(&cmd))
            .await
            .unwrap();
        handler
            .execute(account_id, |account| account.deposit(100, "salary"))
            .await
            .unwrap();

        // An append expecting the pre-deposit version loses the race.
        let conflict = store
            .append_to_stream(
                &format!("account-{account_id}"),
                AppendOptions::expect_version(Version::first()),
                vec![ProposedEvent::new("account_closed", b"{}".to_vec())],
            )
            .await;
        assert!(matches!(
            conflict,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
    }
}
