//! Capability traits for the external log store.
//!
//! The real store lives behind these traits; everything above them (command
//! handling, subscriptions) is written against the capability surface, never
//! a concrete client.

use async_trait::async_trait;

use crate::envelope::{
    ProposedEvent, RecordedEvent, ResolvedEnvelope, SubscriptionMessage, Version,
};
use crate::error::Result;

/// Options for appending events to a stream.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Expected version of the stream for optimistic concurrency control.
    /// If None, no version check is performed.
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the stream to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the stream to not exist yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Append capability.
#[async_trait]
pub trait EventWriter: Send + Sync {
    /// Appends events to a stream atomically, returning the stream's new
    /// version. Fails with `ConcurrencyConflict` when
    /// `options.expected_version` is set and does not match.
    async fn append_to_stream(
        &self,
        stream_id: &str,
        options: AppendOptions,
        events: Vec<ProposedEvent>,
    ) -> Result<Version>;
}

/// Read capability, used to rehydrate aggregates.
#[async_trait]
pub trait EventReader: Send + Sync {
    /// Reads every event of one stream, oldest first. A stream with no
    /// events yields an empty vector.
    async fn read_stream(&self, stream_id: &str) -> Result<Vec<RecordedEvent>>;
}

/// Durable consumer-group capability.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Creates a durable consumer group on a stream. Fails with
    /// `GroupAlreadyExists` when the group is already present; callers
    /// performing idempotent setup treat that as success.
    async fn create_subscription_group(&self, stream: &str, group: &str) -> Result<()>;

    /// Opens a receive handle onto an existing group. Fails with
    /// `GroupNotFound` when the group was never created.
    async fn subscribe_to_group(
        &self,
        stream: &str,
        group: &str,
    ) -> Result<Box<dyn SubscriptionHandle>>;
}

/// Umbrella capability for a full log-store client.
pub trait EventStorer: EventWriter + EventReader + EventSubscriber {}

impl<T: EventWriter + EventReader + EventSubscriber> EventStorer for T {}

/// A live receive handle onto one durable consumer group.
///
/// Every delivered envelope must be answered with exactly one of `ack`
/// ("done, advance"), `nack_retry` ("failed, redeliver") or `nack_skip`
/// ("undeliverable, advance without redelivery").
#[async_trait]
pub trait SubscriptionHandle: Send {
    /// Blocks until the next message arrives. This is the consumer loop's
    /// single suspension point.
    async fn recv(&mut self) -> SubscriptionMessage;

    /// Acknowledges an envelope as processed.
    async fn ack(&mut self, envelope: &ResolvedEnvelope) -> Result<()>;

    /// Rejects an envelope for redelivery.
    async fn nack_retry(&mut self, reason: &str, envelope: &ResolvedEnvelope) -> Result<()>;

    /// Rejects an envelope permanently; it will not be redelivered.
    async fn nack_skip(&mut self, reason: &str, envelope: &ResolvedEnvelope) -> Result<()>;

    /// Closes the handle.
    async fn close(&mut self) -> Result<()>;
}
