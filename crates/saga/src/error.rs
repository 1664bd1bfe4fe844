//! Saga error types.

use thiserror::Error;

/// Boxed error from a command dispatch.
pub type CommandDispatchError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while a saga reacts to an event.
#[derive(Debug, Error)]
pub enum SagaError {
    /// A command issued by the saga was rejected. Surfacing this nack-retries
    /// the triggering event.
    #[error("failed to dispatch command: {0}")]
    CommandDispatch(CommandDispatchError),

    /// The event payload does not belong to this saga's aggregate. The
    /// matcher should have filtered it; seeing one is a wiring error.
    #[error("invalid event for saga. Expected: {expected} Found: {found}")]
    UnexpectedEvent {
        expected: &'static str,
        found: &'static str,
    },
}
