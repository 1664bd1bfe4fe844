//! The handler seam: the engine's view of projections and sagas.

use async_trait::async_trait;
use common::AggregateType;
use event_store::DecodedEvent;

/// Boxed error returned by event handlers.
///
/// The engine never looks inside; it only logs the error and nack-retries
/// the triggering event.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Identifies one registered handler uniquely within its registry.
///
/// Projections derive theirs from the aggregate type; sagas are namespaced
/// with [`HandlerType::for_saga`] so they never collide with the projection
/// of the same aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerType(String);

impl HandlerType {
    /// Creates a handler type from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Handler type for a saga.
    pub fn for_saga(suffix: &str) -> Self {
        Self(format!("saga_{suffix}"))
    }

    /// Returns the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HandlerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HandlerType {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<&AggregateType> for HandlerType {
    fn from(aggregate_type: &AggregateType) -> Self {
        Self(aggregate_type.as_str().to_string())
    }
}

/// A consumer-side event handler.
///
/// Side effects (mutating a read model, issuing further commands) are opaque
/// to the engine; only the returned error is inspected to decide ack versus
/// nack-retry.
#[async_trait]
pub trait EventHandler<P>: Send + Sync {
    /// The identity this handler registers under.
    fn handler_type(&self) -> HandlerType;

    /// Handles one decoded event.
    async fn handle_event(&self, event: &DecodedEvent<P>) -> Result<(), HandlerError>;
}
