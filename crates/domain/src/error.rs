//! Domain error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::account::AccountError;
use crate::aggregate::EventDecodeError;
use crate::movement_type::MovementTypeError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the log store.
    #[error("event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// A stored event could not be reconstructed.
    #[error("event decode error: {0}")]
    EventDecode(#[from] EventDecodeError),

    /// An error occurred in the account aggregate.
    #[error("account error: {0}")]
    Account(#[from] AccountError),

    /// An error occurred in the movement type aggregate.
    #[error("movement type error: {0}")]
    MovementType(#[from] MovementTypeError),

    /// A serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
