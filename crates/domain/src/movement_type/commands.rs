//! Movement type commands.

use common::AggregateId;
use serde::{Deserialize, Serialize};

use super::events::MovementDirection;

/// Registers a new movement type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterMovementType {
    pub movement_type_id: AggregateId,
    pub direction: MovementDirection,
    pub description: String,
    pub notes: Option<String>,
}

impl RegisterMovementType {
    /// Creates the command with a fresh movement type ID.
    pub fn new(
        direction: MovementDirection,
        description: impl Into<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            movement_type_id: AggregateId::new(),
            direction,
            description: description.into(),
            notes,
        }
    }
}
