//! Movement type aggregate and related types.

pub mod aggregate;
pub mod commands;
pub mod events;
pub mod service;

pub use aggregate::{AGGREGATE_TYPE, MovementType, MovementTypeError};
pub use commands::RegisterMovementType;
pub use events::{
    MOVEMENT_TYPE_REGISTERED, MovementDirection, MovementTypeEvent, MovementTypeRegisteredData,
    event_types,
};
pub use service::MovementTypeService;
