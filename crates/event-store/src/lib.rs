//! Log-store client boundary for the wallet ledger.
//!
//! This crate models the external append-only event log as a set of
//! capability traits:
//! - [`EventWriter`] / [`EventReader`] for the command side (append with
//!   optimistic concurrency, stream rehydration)
//! - [`EventSubscriber`] / [`SubscriptionHandle`] for durable consumer
//!   groups with explicit ack / nack-retry / nack-skip
//! - [`EventDecoder`] for turning raw log records into typed domain events
//!
//! [`InMemoryEventStore`] implements the full surface and backs both the
//! test suites and the default process wiring.

pub mod client;
pub mod decoder;
pub mod envelope;
pub mod error;
pub mod memory;

pub use client::{
    AppendOptions, EventReader, EventStorer, EventSubscriber, EventWriter, SubscriptionHandle,
};
pub use decoder::{DecodeError, DecodeFn, DecodedEvent, EventDecoder, EventRegister};
pub use envelope::{
    DroppedSubscription, EventId, ProposedEvent, RecordedEvent, ResolvedEnvelope,
    SubscriptionMessage, Version,
};
pub use error::{EventStoreError, Result};
pub use memory::InMemoryEventStore;
