//! Projection error types.

use thiserror::Error;

/// Errors that can occur while applying events to a read model.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The event payload belongs to a different aggregate than this view
    /// folds. The matcher should have filtered it; seeing one is a wiring
    /// error.
    #[error("invalid event for projection. Expected: {expected} Found: {found}")]
    UnexpectedEvent {
        expected: &'static str,
        found: &'static str,
    },

    /// A projection-specific error.
    #[error("projection error: {0}")]
    Projection(String),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
