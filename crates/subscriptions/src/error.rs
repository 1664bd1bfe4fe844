//! Engine error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::handler::HandlerType;

/// Errors raised while building or querying a handler registry.
///
/// All of these are programming errors surfaced during the registration
/// phase; startup aborts on the first one.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The matcher recognizes no event types.
    #[error("missing event matcher")]
    MissingMatcher,

    /// An entry already exists for the handler type. The existing entry is
    /// left unchanged.
    #[error("event handler already added: {0}")]
    DuplicateHandler(HandlerType),

    /// No entry exists for the requested handler type.
    #[error("no event handler found. Handler type: {0}")]
    HandlerNotFound(HandlerType),
}

/// Errors raised while wiring a subscription at startup.
#[derive(Debug, Error)]
pub enum SubscribeError {
    /// The registry holds no entry for the requested handler type.
    #[error("failed to resolve event handler. HandlerType: {handler_type} Group: {group}")]
    HandlerResolution {
        handler_type: HandlerType,
        group: String,
        #[source]
        source: RegistryError,
    },

    /// The durable group could not be created (an existing group is not an
    /// error; see `SubscriptionConsumer::ensure_group`).
    #[error("failed to create subscription group. Stream: {stream} Group: {group}")]
    GroupCreation {
        stream: String,
        group: String,
        #[source]
        source: EventStoreError,
    },
}
