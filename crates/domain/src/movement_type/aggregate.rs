//! Movement type aggregate.

use chrono::Utc;
use common::AggregateId;
use event_store::Version;
use thiserror::Error;

use crate::aggregate::Aggregate;

use super::commands::RegisterMovementType;
use super::events::{MovementDirection, MovementTypeEvent, MovementTypeRegisteredData};

pub const AGGREGATE_TYPE: &str = "movement_type";

/// Errors from movement type command handling.
#[derive(Debug, Error)]
pub enum MovementTypeError {
    #[error("movement type already registered")]
    AlreadyRegistered,

    #[error("movement type description must not be empty")]
    EmptyDescription,
}

/// A registered category of account movements.
#[derive(Debug, Clone, Default)]
pub struct MovementType {
    id: Option<AggregateId>,
    direction: Option<MovementDirection>,
    description: String,
    notes: Option<String>,
    version: Version,
}

impl MovementType {
    /// Decides the registration of the movement type.
    pub fn register(
        &self,
        cmd: &RegisterMovementType,
    ) -> Result<Vec<MovementTypeEvent>, MovementTypeError> {
        if self.id.is_some() {
            return Err(MovementTypeError::AlreadyRegistered);
        }
        if cmd.description.trim().is_empty() {
            return Err(MovementTypeError::EmptyDescription);
        }

        Ok(vec![MovementTypeEvent::Registered(
            MovementTypeRegisteredData {
                movement_type_id: cmd.movement_type_id,
                direction: cmd.direction,
                description: cmd.description.clone(),
                notes: cmd.notes.clone(),
                registered_at: Utc::now(),
            },
        )])
    }

    pub fn direction(&self) -> Option<MovementDirection> {
        self.direction
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

impl Aggregate for MovementType {
    type Event = MovementTypeEvent;
    type Error = MovementTypeError;

    fn aggregate_type() -> &'static str {
        AGGREGATE_TYPE
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: MovementTypeEvent) {
        match event {
            MovementTypeEvent::Registered(data) => {
                self.id = Some(data.movement_type_id);
                self.direction = Some(data.direction);
                self.description = data.description;
                self.notes = data.notes;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_emits_registered_event() {
        let movement_type = MovementType::default();
        let cmd = RegisterMovementType::new(MovementDirection::Debit, "groceries", None);

        let events = movement_type.register(&cmd).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn register_twice_is_rejected() {
        let mut movement_type = MovementType::default();
        let cmd = RegisterMovementType::new(MovementDirection::Debit, "groceries", None);
        movement_type.apply_events(movement_type.register(&cmd).unwrap());

        assert!(matches!(
            movement_type.register(&cmd),
            Err(MovementTypeError::AlreadyRegistered)
        ));
    }

    #[test]
    fn empty_description_is_rejected() {
        let movement_type = MovementType::default();
        let cmd = RegisterMovementType::new(MovementDirection::Credit, "  ", None);

        assert!(matches!(
            movement_type.register(&cmd),
            Err(MovementTypeError::EmptyDescription)
        ));
    }
}
