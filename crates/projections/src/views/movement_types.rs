//! Movement types read model.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{MovementDirection, MovementTypeEvent, WalletEvent, movement_type};
use event_store::DecodedEvent;
use subscriptions::{EventHandler, HandlerError, HandlerType};
use tokio::sync::RwLock;

use crate::error::ProjectionError;

/// Summary of one registered movement type.
#[derive(Debug, Clone)]
pub struct MovementTypeSummary {
    pub movement_type_id: AggregateId,
    pub direction: MovementDirection,
    pub description: String,
    pub notes: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// Read model view of every registered movement type.
#[derive(Clone, Default)]
pub struct MovementTypesView {
    movement_types: Arc<RwLock<HashMap<AggregateId, MovementTypeSummary>>>,
}

impl MovementTypesView {
    /// Creates a new empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets one movement type.
    pub async fn get_movement_type(
        &self,
        movement_type_id: AggregateId,
    ) -> Option<MovementTypeSummary> {
        self.movement_types
            .read()
            .await
            .get(&movement_type_id)
            .cloned()
    }

    /// Gets all registered movement types.
    pub async fn all_movement_types(&self) -> Vec<MovementTypeSummary> {
        self.movement_types.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl EventHandler<WalletEvent> for MovementTypesView {
    fn handler_type(&self) -> HandlerType {
        HandlerType::from(movement_type::AGGREGATE_TYPE)
    }

    async fn handle_event(&self, event: &DecodedEvent<WalletEvent>) -> Result<(), HandlerError> {
        let WalletEvent::MovementType(movement_event) = &event.payload else {
            return Err(Box::new(ProjectionError::UnexpectedEvent {
                expected: movement_type::AGGREGATE_TYPE,
                found: event.payload.event_type(),
            }));
        };

        match movement_event {
            MovementTypeEvent::Registered(data) => {
                self.movement_types.write().await.insert(
                    event.aggregate_id,
                    MovementTypeSummary {
                        movement_type_id: data.movement_type_id,
                        direction: data.direction,
                        description: data.description.clone(),
                        notes: data.notes.clone(),
                        registered_at: data.registered_at,
                    },
                );
            }
        }

        metrics::counter!("projection_events_applied", "view" => "movement_types").increment(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::AggregateType;
    use domain::movement_type::MovementTypeRegisteredData;
    use event_store::Version;

    #[tokio::test]
    async fn registered_movement_type_appears_in_the_view() {
        let view = MovementTypesView::new();
        let movement_type_id = AggregateId::new();

        let event = DecodedEvent {
            event_type: movement_type::MOVEMENT_TYPE_REGISTERED.to_string(),
            aggregate_type: AggregateType::from("movement_type"),
            aggregate_id: movement_type_id,
            version: Version::first(),
            timestamp: Utc::now(),
            payload: WalletEvent::MovementType(MovementTypeEvent::Registered(
                MovementTypeRegisteredData {
                    movement_type_id,
                    direction: MovementDirection::Credit,
                    description: "salary".to_string(),
                    notes: None,
                    registered_at: Utc::now(),
                },
            )),
        };

        view.handle_event(&event).await.unwrap();

        let summary = view.get_movement_type(movement_type_id).await.unwrap();
        assert_eq!(summary.direction, MovementDirection::Credit);
        assert_eq!(view.all_movement_types().await.len(), 1);
    }
}
