use thiserror::Error;

use crate::envelope::Version;

/// Errors that can occur when interacting with the log store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The durable subscription group is already present on the stream.
    /// Callers creating groups idempotently treat this as success.
    #[error("subscription group already exists. Stream: {stream} Group: {group}")]
    GroupAlreadyExists { stream: String, group: String },

    /// No such durable subscription group on the stream.
    #[error("subscription group not found. Stream: {stream} Group: {group}")]
    GroupNotFound { stream: String, group: String },

    /// The expected version did not match the stream's actual version.
    #[error("concurrency conflict on stream {stream_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        stream_id: String,
        expected: Version,
        actual: Version,
    },

    /// The subscription was terminated by the server or transport.
    #[error("subscription dropped: {0}")]
    SubscriptionDropped(String),

    /// A connection-level failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// A serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for log-store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
