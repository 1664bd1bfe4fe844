//! Movement type domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::{DomainEvent, EventDecodeError};

pub const MOVEMENT_TYPE_REGISTERED: &str = "movement_type_registered";

/// Every movement type event type name.
pub fn event_types() -> [&'static str; 1] {
    [MOVEMENT_TYPE_REGISTERED]
}

/// Whether movements of this type credit or debit an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    Debit,
    Credit,
}

impl std::fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementDirection::Debit => write!(f, "debit"),
            MovementDirection::Credit => write!(f, "credit"),
        }
    }
}

/// Events that can occur on a movement type aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MovementTypeEvent {
    /// Movement type was registered.
    Registered(MovementTypeRegisteredData),
}

/// Data for movement_type_registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementTypeRegisteredData {
    pub movement_type_id: AggregateId,
    pub direction: MovementDirection,
    pub description: String,
    pub notes: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl DomainEvent for MovementTypeEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MovementTypeEvent::Registered(_) => MOVEMENT_TYPE_REGISTERED,
        }
    }

    fn encode(&self) -> serde_json::Result<Vec<u8>> {
        match self {
            MovementTypeEvent::Registered(data) => serde_json::to_vec(data),
        }
    }

    fn decode(event_type: &str, data: &[u8]) -> Result<Self, EventDecodeError> {
        match event_type {
            MOVEMENT_TYPE_REGISTERED => Ok(Self::Registered(serde_json::from_slice(data)?)),
            other => Err(EventDecodeError::UnrecognizedEventType(other.to_string())),
        }
    }
}
