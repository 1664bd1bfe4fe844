//! Durable event-stream consumption engine.
//!
//! Subscribes to the append-only event log via competing-consumer groups,
//! decodes and routes events to the registered handler, and manages the
//! acknowledgment/retry/reconnect protocol that gives at-least-once delivery
//! with failure isolation.
//!
//! - [`HandlerRegistry`] binds an [`EventMatcher`] to an [`EventHandler`]
//!   and enforces one handler per [`HandlerType`]
//! - [`SubscriptionConsumer`] runs the receive → route → ack loop for one
//!   aggregate type, reconnecting on drops
//! - [`Lifecycle`] plus [`subscribe_for_projections`] /
//!   [`subscribe_for_sagas`] bind consumer tasks to process start/stop

pub mod consumer;
pub mod error;
pub mod handler;
pub mod lifecycle;
pub mod matcher;
pub mod registry;

pub use consumer::{
    METADATA_EVENT_TYPE, SubscriptionConsumer, SubscriptionPurpose, group_name, stream_name,
};
pub use error::{RegistryError, SubscribeError};
pub use handler::{EventHandler, HandlerError, HandlerType};
pub use lifecycle::{Lifecycle, subscribe_event_stream, subscribe_for_projections, subscribe_for_sagas};
pub use matcher::EventMatcher;
pub use registry::{HandlerEntry, HandlerProvider, HandlerRegistry};
