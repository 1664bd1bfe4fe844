//! Core aggregate and domain event traits.

use common::AggregateId;
use event_store::Version;
use thiserror::Error;

/// Error reconstructing a domain event from its stored form.
#[derive(Debug, Error)]
pub enum EventDecodeError {
    /// The event type name is not one this aggregate produces.
    #[error("unrecognized event type: {0}")]
    UnrecognizedEventType(String),

    /// The payload did not deserialize as the event's data struct.
    #[error("malformed event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain. They are
/// immutable and named in past tense. The stored payload is the event's data
/// struct alone; the type name travels in the record's envelope.
pub trait DomainEvent: Send + Sync + Clone {
    /// Returns the event type name used in the log store.
    fn event_type(&self) -> &'static str;

    /// Serializes the event's data payload.
    fn encode(&self) -> serde_json::Result<Vec<u8>>;

    /// Reconstructs an event from its type name and payload.
    fn decode(event_type: &str, data: &[u8]) -> Result<Self, EventDecodeError>;
}

/// Trait for aggregates in an event-sourced system.
///
/// In event sourcing, aggregates:
/// - Are rebuilt by replaying events
/// - Generate events from commands
/// - Apply events to update state (pure, deterministic)
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate can produce.
    type Error: std::error::Error + Send + Sync;

    /// Returns the aggregate type name.
    ///
    /// Used as the stream id prefix and for routing.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's unique identifier.
    ///
    /// Returns None for a new, uninitialized aggregate.
    fn id(&self) -> Option<AggregateId>;

    /// Returns the current version of the aggregate.
    fn version(&self) -> Version;

    /// Sets the aggregate version.
    ///
    /// Called by the command handler after loading events.
    fn set_version(&mut self, version: Version);

    /// Applies an event to the aggregate, updating its state.
    ///
    /// Must be pure and deterministic, must not fail: events are facts that
    /// have already happened.
    fn apply(&mut self, event: Self::Event);

    /// Applies multiple events in sequence.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}
