//! Decoding raw log records into typed domain events.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{AggregateId, AggregateType};
use thiserror::Error;

use crate::envelope::{RecordedEvent, Version};

/// Deserializes one registered event type's payload.
pub type DecodeFn<P> = fn(&[u8]) -> serde_json::Result<P>;

/// Associates an event type name with its payload decoder.
///
/// Each aggregate module exposes a list of these; the process wires them all
/// into one [`EventDecoder`] at startup.
pub struct EventRegister<P> {
    pub event_type: &'static str,
    pub decode: DecodeFn<P>,
}

/// A typed domain event decoded from a raw log record.
#[derive(Debug, Clone)]
pub struct DecodedEvent<P> {
    /// The event type name.
    pub event_type: String,

    /// The stream family the event belongs to.
    pub aggregate_type: AggregateType,

    /// The aggregate instance the event belongs to.
    pub aggregate_id: AggregateId,

    /// The aggregate's version after this event.
    pub version: Version,

    /// When the store recorded the event.
    pub timestamp: DateTime<Utc>,

    /// The typed payload.
    pub payload: P,
}

/// Errors that can occur while decoding a raw record.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The event type has no registered payload decoder.
    #[error("unregistered event type: {0}")]
    UnregisteredEventType(String),

    /// The stream id does not follow `"<aggregate type>-<uuid>"`.
    #[error("malformed stream id: {0}")]
    MalformedStreamId(String),

    /// The stream id suffix is not a valid aggregate id.
    #[error("invalid aggregate id in stream {stream_id}: {source}")]
    InvalidAggregateId {
        stream_id: String,
        source: uuid::Error,
    },

    /// The payload bytes did not deserialize as the registered type.
    #[error("failed to deserialize payload of {event_type}: {source}")]
    Payload {
        event_type: String,
        source: serde_json::Error,
    },
}

/// Table of payload decoders keyed by event type name.
///
/// Built once at startup and immutable thereafter. [`EventDecoder::decode`]
/// is deterministic and side-effect-free, so a nacked record is safe to
/// decode again on redelivery.
pub struct EventDecoder<P> {
    decoders: HashMap<&'static str, DecodeFn<P>>,
}

impl<P> EventDecoder<P> {
    /// Creates an empty decoder table.
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Builds a decoder table from register lists.
    pub fn from_registers(registers: impl IntoIterator<Item = EventRegister<P>>) -> Self {
        let mut decoder = Self::new();
        for register in registers {
            decoder.register(register);
        }
        decoder
    }

    /// Adds one event type's decoder.
    pub fn register(&mut self, register: EventRegister<P>) {
        self.decoders.insert(register.event_type, register.decode);
    }

    /// Whether a decoder is registered for the event type.
    pub fn is_registered(&self, event_type: &str) -> bool {
        self.decoders.contains_key(event_type)
    }

    /// Decodes a recorded event into its typed form.
    ///
    /// The aggregate type and id are recovered from the stream id
    /// (`"<aggregate type>-<uuid>"`, split at the first `-`); the version is
    /// the stream position plus one.
    pub fn decode(&self, event: &RecordedEvent) -> Result<DecodedEvent<P>, DecodeError> {
        let decode = self
            .decoders
            .get(event.event_type.as_str())
            .ok_or_else(|| DecodeError::UnregisteredEventType(event.event_type.clone()))?;

        let (aggregate_type, id_part) = event
            .stream_id
            .split_once('-')
            .ok_or_else(|| DecodeError::MalformedStreamId(event.stream_id.clone()))?;

        let aggregate_id =
            AggregateId::parse(id_part).map_err(|source| DecodeError::InvalidAggregateId {
                stream_id: event.stream_id.clone(),
                source,
            })?;

        let payload = decode(&event.data).map_err(|source| DecodeError::Payload {
            event_type: event.event_type.clone(),
            source,
        })?;

        Ok(DecodedEvent {
            event_type: event.event_type.clone(),
            aggregate_type: AggregateType::new(aggregate_type),
            aggregate_id,
            version: Version::new(event.position as i64 + 1),
            timestamp: event.created,
            payload,
        })
    }
}

impl<P> Default for EventDecoder<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EventId;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq)]
    enum TestPayload {
        Opened { name: String },
        Closed,
    }

    #[derive(Deserialize)]
    struct OpenedData {
        name: String,
    }

    fn registers() -> Vec<EventRegister<TestPayload>> {
        vec![
            EventRegister {
                event_type: "opened",
                decode: |data| {
                    let data: OpenedData = serde_json::from_slice(data)?;
                    Ok(TestPayload::Opened { name: data.name })
                },
            },
            EventRegister {
                event_type: "closed",
                decode: |_| Ok(TestPayload::Closed),
            },
        ]
    }

    fn recorded(event_type: &str, stream_id: &str, data: &[u8]) -> RecordedEvent {
        RecordedEvent {
            event_id: EventId::new(),
            event_type: event_type.to_string(),
            stream_id: stream_id.to_string(),
            position: 2,
            data: data.to_vec(),
            created: Utc::now(),
        }
    }

    #[test]
    fn decodes_registered_event() {
        let decoder = EventDecoder::from_registers(registers());
        let id = AggregateId::new();
        let event = recorded("opened", &format!("account-{id}"), br#"{"name":"main"}"#);

        let decoded = decoder.decode(&event).unwrap();
        assert_eq!(decoded.aggregate_type.as_str(), "account");
        assert_eq!(decoded.aggregate_id, id);
        assert_eq!(decoded.version, Version::new(3));
        assert_eq!(
            decoded.payload,
            TestPayload::Opened {
                name: "main".to_string()
            }
        );
    }

    #[test]
    fn rejects_unregistered_event_type() {
        let decoder = EventDecoder::from_registers(registers());
        let id = AggregateId::new();
        let event = recorded("renamed", &format!("account-{id}"), b"{}");

        assert!(matches!(
            decoder.decode(&event),
            Err(DecodeError::UnregisteredEventType(t)) if t == "renamed"
        ));
    }

    #[test]
    fn rejects_stream_id_without_separator() {
        let decoder = EventDecoder::from_registers(registers());
        let event = recorded("closed", "account", b"{}");

        assert!(matches!(
            decoder.decode(&event),
            Err(DecodeError::MalformedStreamId(_))
        ));
    }

    #[test]
    fn rejects_non_uuid_aggregate_id() {
        let decoder = EventDecoder::from_registers(registers());
        let event = recorded("closed", "account-not_a_uuid", b"{}");

        assert!(matches!(
            decoder.decode(&event),
            Err(DecodeError::InvalidAggregateId { .. })
        ));
    }

    #[test]
    fn rejects_malformed_payload() {
        let decoder = EventDecoder::from_registers(registers());
        let id = AggregateId::new();
        let event = recorded("opened", &format!("account-{id}"), b"not json");

        assert!(matches!(
            decoder.decode(&event),
            Err(DecodeError::Payload { .. })
        ));
    }

    #[test]
    fn is_registered_reflects_table() {
        let decoder = EventDecoder::from_registers(registers());
        assert!(decoder.is_registered("opened"));
        assert!(!decoder.is_registered("renamed"));
    }
}
