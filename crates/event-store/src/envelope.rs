//! Event envelopes and subscription messages exchanged with the log store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EventStoreError;

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Version number for an aggregate stream, used for optimistic concurrency
/// control.
///
/// Versions start at 1 for the first event and increment by 1 for each
/// subsequent event on the stream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) for a stream with no events.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the first version (1) for the first event.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event proposed for appending to a stream.
#[derive(Debug, Clone)]
pub struct ProposedEvent {
    /// Unique identifier assigned by the producer.
    pub event_id: EventId,

    /// The event type name (e.g. `"account_opened"`).
    pub event_type: String,

    /// Serialized event payload.
    pub data: Vec<u8>,
}

impl ProposedEvent {
    /// Creates a proposed event with a fresh event ID.
    pub fn new(event_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            event_id: EventId::new(),
            event_type: event_type.into(),
            data,
        }
    }
}

/// An event as recorded in the log store.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// The event type name.
    pub event_type: String,

    /// The stream the event was appended to (`"<aggregate type>-<uuid>"`).
    pub stream_id: String,

    /// Zero-based position of the event within its stream.
    pub position: u64,

    /// Serialized event payload.
    pub data: Vec<u8>,

    /// When the store recorded the event.
    pub created: DateTime<Utc>,
}

/// A message delivered by a durable subscription.
///
/// For events reached through a category stream, `link` is the pointer record
/// in the category feed and `event` the resolved original. A bare link with no
/// resolvable event means there is nothing to process.
#[derive(Debug, Clone)]
pub struct ResolvedEnvelope {
    /// The resolved event, if any.
    pub event: Option<RecordedEvent>,

    /// The link record that pointed at the event, if the delivery came
    /// through a category stream.
    pub link: Option<RecordedEvent>,
}

impl ResolvedEnvelope {
    /// Wraps a directly recorded event (no link indirection).
    pub fn from_event(event: RecordedEvent) -> Self {
        Self {
            event: Some(event),
            link: None,
        }
    }

    /// The event type of the resolved event, if any.
    pub fn event_type(&self) -> Option<&str> {
        self.event.as_ref().map(|e| e.event_type.as_str())
    }

    /// Identifying description for log messages, preferring the link record
    /// when present (its position locates the delivery in the feed).
    pub fn describe(&self) -> String {
        match self.link.as_ref().or(self.event.as_ref()) {
            Some(record) => format!(
                "EventId: {} EventType: {} Position: {}",
                record.event_id, record.event_type, record.position
            ),
            None => "empty envelope".to_string(),
        }
    }
}

/// Signal that a subscription was terminated by the server or transport.
#[derive(Debug)]
pub struct DroppedSubscription {
    /// Why the subscription was dropped.
    pub reason: EventStoreError,

    /// An event that was in flight when the drop arrived, if any. It has not
    /// been acknowledged and must be nacked for redelivery.
    pub envelope: Option<ResolvedEnvelope>,
}

/// What a blocking receive on a subscription handle can yield.
#[derive(Debug)]
pub enum SubscriptionMessage {
    /// A message delivered for processing.
    Event(ResolvedEnvelope),

    /// The receive deadline elapsed with no traffic. A keep-alive, not a
    /// failure.
    DeadlineExceeded,

    /// The subscription was dropped.
    Dropped(DroppedSubscription),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded(event_type: &str, position: u64) -> RecordedEvent {
        RecordedEvent {
            event_id: EventId::new(),
            event_type: event_type.to_string(),
            stream_id: "account-00000000-0000-0000-0000-000000000000".to_string(),
            position,
            data: b"{}".to_vec(),
            created: Utc::now(),
        }
    }

    #[test]
    fn event_id_new_creates_unique_ids() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn version_ordering_and_next() {
        let v1 = Version::first();
        let v2 = v1.next();
        assert!(v1 < v2);
        assert_eq!(v2.as_i64(), 2);
        assert_eq!(Version::initial().next(), Version::first());
    }

    #[test]
    fn envelope_event_type_of_resolved_event() {
        let envelope = ResolvedEnvelope::from_event(recorded("account_opened", 0));
        assert_eq!(envelope.event_type(), Some("account_opened"));
    }

    #[test]
    fn envelope_describe_prefers_link() {
        let envelope = ResolvedEnvelope {
            event: Some(recorded("account_opened", 0)),
            link: Some(recorded("$>", 7)),
        };
        assert!(envelope.describe().contains("Position: 7"));
    }

    #[test]
    fn envelope_describe_handles_empty() {
        let envelope = ResolvedEnvelope {
            event: None,
            link: None,
        };
        assert_eq!(envelope.describe(), "empty envelope");
    }
}
