//! In-memory log store with durable consumer-group semantics.
//!
//! Backs the test suites and the default process wiring. Streams are
//! append-only vectors; every append is mirrored into the category feed
//! (`"$ce-<aggregate type>"`) that durable groups consume. A group tracks a
//! cursor into its category feed plus a redelivery queue fed by nack-retry.
//! Cursors start at the beginning of the feed, so a fresh group catches up
//! from genesis.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, Notify};

use crate::client::{
    AppendOptions, EventReader, EventSubscriber, EventWriter, SubscriptionHandle,
};
use crate::envelope::{
    DroppedSubscription, ProposedEvent, RecordedEvent, ResolvedEnvelope, SubscriptionMessage,
    Version,
};
use crate::error::{EventStoreError, Result};

/// In-memory implementation of the full log-store capability surface.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<StoreState>,
    wakeup: Notify,
}

#[derive(Default)]
struct StoreState {
    streams: HashMap<String, Vec<RecordedEvent>>,
    categories: HashMap<String, Vec<RecordedEvent>>,
    groups: HashMap<GroupKey, GroupState>,
}

type GroupKey = (String, String);

#[derive(Default)]
struct GroupState {
    cursor: usize,
    redeliver: VecDeque<RecordedEvent>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events across all streams.
    pub async fn event_count(&self) -> usize {
        let state = self.inner.state.lock().await;
        state.streams.values().map(Vec::len).sum()
    }

    /// Category feed name for a stream id, when the id carries an aggregate
    /// type prefix.
    fn category_for(stream_id: &str) -> Option<String> {
        stream_id
            .split_once('-')
            .map(|(aggregate_type, _)| format!("$ce-{aggregate_type}"))
    }
}

#[async_trait]
impl EventWriter for InMemoryEventStore {
    async fn append_to_stream(
        &self,
        stream_id: &str,
        options: AppendOptions,
        events: Vec<ProposedEvent>,
    ) -> Result<Version> {
        let mut state = self.inner.state.lock().await;
        let stream = state.streams.entry(stream_id.to_string()).or_default();

        let current = Version::new(stream.len() as i64);
        if let Some(expected) = options.expected_version
            && expected != current
        {
            return Err(EventStoreError::ConcurrencyConflict {
                stream_id: stream_id.to_string(),
                expected,
                actual: current,
            });
        }

        let mut appended = Vec::with_capacity(events.len());
        for proposed in events {
            let recorded = RecordedEvent {
                event_id: proposed.event_id,
                event_type: proposed.event_type,
                stream_id: stream_id.to_string(),
                position: stream.len() as u64,
                data: proposed.data,
                created: Utc::now(),
            };
            stream.push(recorded.clone());
            appended.push(recorded);
        }
        let new_version = Version::new(stream.len() as i64);

        if let Some(category) = Self::category_for(stream_id) {
            state.categories.entry(category).or_default().extend(appended);
        }

        drop(state);
        self.inner.wakeup.notify_waiters();

        Ok(new_version)
    }
}

#[async_trait]
impl EventReader for InMemoryEventStore {
    async fn read_stream(&self, stream_id: &str) -> Result<Vec<RecordedEvent>> {
        let state = self.inner.state.lock().await;
        Ok(state.streams.get(stream_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl EventSubscriber for InMemoryEventStore {
    async fn create_subscription_group(&self, stream: &str, group: &str) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        let key = (stream.to_string(), group.to_string());

        if state.groups.contains_key(&key) {
            return Err(EventStoreError::GroupAlreadyExists {
                stream: stream.to_string(),
                group: group.to_string(),
            });
        }

        state.groups.insert(key, GroupState::default());
        Ok(())
    }

    async fn subscribe_to_group(
        &self,
        stream: &str,
        group: &str,
    ) -> Result<Box<dyn SubscriptionHandle>> {
        let state = self.inner.state.lock().await;
        let key = (stream.to_string(), group.to_string());

        if !state.groups.contains_key(&key) {
            return Err(EventStoreError::GroupNotFound {
                stream: stream.to_string(),
                group: group.to_string(),
            });
        }

        Ok(Box::new(InMemorySubscription {
            store: self.clone(),
            stream: stream.to_string(),
            group: group.to_string(),
            closed: false,
        }))
    }
}

/// Receive handle onto one in-memory consumer group.
pub struct InMemorySubscription {
    store: InMemoryEventStore,
    stream: String,
    group: String,
    closed: bool,
}

impl InMemorySubscription {
    /// Pops the next deliverable event: redeliveries first, then the feed.
    /// The cursor advances on delivery; nack-retry puts an event back.
    async fn try_next(&self) -> Option<RecordedEvent> {
        let mut state = self.store.inner.state.lock().await;
        let StoreState {
            categories, groups, ..
        } = &mut *state;

        let group = groups.get_mut(&(self.stream.clone(), self.group.clone()))?;
        if let Some(event) = group.redeliver.pop_front() {
            return Some(event);
        }

        let feed = categories.get(&self.stream)?;
        if group.cursor < feed.len() {
            let event = feed[group.cursor].clone();
            group.cursor += 1;
            return Some(event);
        }

        None
    }
}

#[async_trait]
impl SubscriptionHandle for InMemorySubscription {
    async fn recv(&mut self) -> SubscriptionMessage {
        loop {
            if self.closed {
                return SubscriptionMessage::Dropped(DroppedSubscription {
                    reason: EventStoreError::SubscriptionDropped(
                        "subscription handle closed".to_string(),
                    ),
                    envelope: None,
                });
            }

            // Register interest before re-checking, so an append between the
            // check and the await still wakes us.
            let wakeup = self.store.inner.wakeup.notified();
            if let Some(event) = self.try_next().await {
                return SubscriptionMessage::Event(ResolvedEnvelope::from_event(event));
            }
            wakeup.await;
        }
    }

    async fn ack(&mut self, _envelope: &ResolvedEnvelope) -> Result<()> {
        Ok(())
    }

    async fn nack_retry(&mut self, reason: &str, envelope: &ResolvedEnvelope) -> Result<()> {
        let Some(event) = envelope.event.clone() else {
            return Ok(());
        };

        tracing::debug!(
            stream = %self.stream,
            group = %self.group,
            reason,
            "event queued for redelivery"
        );

        let mut state = self.store.inner.state.lock().await;
        if let Some(group) = state
            .groups
            .get_mut(&(self.stream.clone(), self.group.clone()))
        {
            group.redeliver.push_back(event);
        }
        drop(state);
        self.store.inner.wakeup.notify_waiters();

        Ok(())
    }

    async fn nack_skip(&mut self, reason: &str, envelope: &ResolvedEnvelope) -> Result<()> {
        tracing::debug!(
            stream = %self.stream,
            group = %self.group,
            reason,
            envelope = %envelope.describe(),
            "event skipped permanently"
        );
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{AggregateId, AggregateType};
    use tokio::time::{Duration, timeout};

    fn proposed(event_type: &str) -> ProposedEvent {
        ProposedEvent::new(event_type, br#"{"test":true}"#.to_vec())
    }

    fn account_stream() -> String {
        AggregateType::from("account").stream_id(AggregateId::new())
    }

    #[tokio::test]
    async fn append_and_read_stream() {
        let store = InMemoryEventStore::new();
        let stream = account_stream();

        let version = store
            .append_to_stream(
                &stream,
                AppendOptions::expect_new(),
                vec![proposed("account_opened"), proposed("funds_deposited")],
            )
            .await
            .unwrap();
        assert_eq!(version, Version::new(2));

        let events = store.read_stream(&stream).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].position, 0);
        assert_eq!(events[1].position, 1);
        assert_eq!(events[0].event_type, "account_opened");
    }

    #[tokio::test]
    async fn append_rejects_wrong_expected_version() {
        let store = InMemoryEventStore::new();
        let stream = account_stream();

        store
            .append_to_stream(
                &stream,
                AppendOptions::expect_new(),
                vec![proposed("account_opened")],
            )
            .await
            .unwrap();

        let result = store
            .append_to_stream(
                &stream,
                AppendOptions::expect_new(),
                vec![proposed("funds_deposited")],
            )
            .await;

        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { .. })
        ));
    }

    #[tokio::test]
    async fn create_group_twice_reports_already_exists() {
        let store = InMemoryEventStore::new();

        store
            .create_subscription_group("$ce-account", "subscription-group-projections")
            .await
            .unwrap();

        let second = store
            .create_subscription_group("$ce-account", "subscription-group-projections")
            .await;
        assert!(matches!(
            second,
            Err(EventStoreError::GroupAlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn subscribe_to_unknown_group_fails() {
        let store = InMemoryEventStore::new();
        let result = store
            .subscribe_to_group("$ce-account", "subscription-group-projections")
            .await;
        assert!(matches!(result, Err(EventStoreError::GroupNotFound { .. })));
    }

    #[tokio::test]
    async fn group_receives_events_from_all_streams_of_the_category() {
        let store = InMemoryEventStore::new();
        store
            .create_subscription_group("$ce-account", "subscription-group-projections")
            .await
            .unwrap();
        let mut subscription = store
            .subscribe_to_group("$ce-account", "subscription-group-projections")
            .await
            .unwrap();

        let first = account_stream();
        let second = account_stream();
        store
            .append_to_stream(&first, AppendOptions::new(), vec![proposed("account_opened")])
            .await
            .unwrap();
        store
            .append_to_stream(&second, AppendOptions::new(), vec![proposed("account_opened")])
            .await
            .unwrap();

        for expected_stream in [&first, &second] {
            let message = timeout(Duration::from_secs(1), subscription.recv())
                .await
                .unwrap();
            match message {
                SubscriptionMessage::Event(envelope) => {
                    assert_eq!(&envelope.event.unwrap().stream_id, expected_stream);
                }
                other => panic!("expected event, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn nack_retry_redelivers_the_event() {
        let store = InMemoryEventStore::new();
        store
            .create_subscription_group("$ce-account", "g")
            .await
            .unwrap();
        let mut subscription = store.subscribe_to_group("$ce-account", "g").await.unwrap();

        store
            .append_to_stream(
                &account_stream(),
                AppendOptions::new(),
                vec![proposed("account_opened")],
            )
            .await
            .unwrap();

        let SubscriptionMessage::Event(envelope) =
            timeout(Duration::from_secs(1), subscription.recv())
                .await
                .unwrap()
        else {
            panic!("expected event");
        };

        subscription
            .nack_retry("handler failed", &envelope)
            .await
            .unwrap();

        let SubscriptionMessage::Event(redelivered) =
            timeout(Duration::from_secs(1), subscription.recv())
                .await
                .unwrap()
        else {
            panic!("expected redelivery");
        };
        assert_eq!(
            redelivered.event.unwrap().event_id,
            envelope.event.unwrap().event_id
        );
    }

    #[tokio::test]
    async fn recv_wakes_on_later_append() {
        let store = InMemoryEventStore::new();
        store
            .create_subscription_group("$ce-account", "g")
            .await
            .unwrap();
        let mut subscription = store.subscribe_to_group("$ce-account", "g").await.unwrap();

        let writer = store.clone();
        let stream = account_stream();
        let append = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer
                .append_to_stream(&stream, AppendOptions::new(), vec![proposed("account_opened")])
                .await
                .unwrap();
        });

        let message = timeout(Duration::from_secs(1), subscription.recv())
            .await
            .unwrap();
        assert!(matches!(message, SubscriptionMessage::Event(_)));
        append.await.unwrap();
    }

    #[tokio::test]
    async fn closed_handle_reports_drop() {
        let store = InMemoryEventStore::new();
        store
            .create_subscription_group("$ce-account", "g")
            .await
            .unwrap();
        let mut subscription = store.subscribe_to_group("$ce-account", "g").await.unwrap();

        subscription.close().await.unwrap();
        let message = subscription.recv().await;
        assert!(matches!(message, SubscriptionMessage::Dropped(_)));
    }
}
