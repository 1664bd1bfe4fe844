//! Movement type service.

use common::AggregateId;
use event_store::{EventReader, EventWriter};

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::aggregate::MovementType;
use super::commands::RegisterMovementType;

/// Service for managing movement types.
pub struct MovementTypeService<S: EventWriter + EventReader> {
    handler: CommandHandler<S, MovementType>,
}

impl<S: EventWriter + EventReader> MovementTypeService<S> {
    /// Creates a new movement type service with the given store client.
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    /// Registers a new movement type.
    #[tracing::instrument(skip(self))]
    pub async fn register(
        &self,
        cmd: RegisterMovementType,
    ) -> Result<CommandResult<MovementType>, DomainError> {
        self.handler
            .execute(cmd.movement_type_id, |movement_type| {
                movement_type.register(&cmd)
            })
            .await
    }

    /// Loads a movement type by ID, returning None if it doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_movement_type(
        &self,
        movement_type_id: AggregateId,
    ) -> Result<Option<MovementType>, DomainError> {
        self.handler.load_existing(movement_type_id).await
    }
}
