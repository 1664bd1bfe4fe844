//! Event-reactive sagas (process managers).
//!
//! A [`Saga`] reacts to decoded events by issuing further commands through
//! the [`CommandSender`] seam; [`SagaEventHandler`] adapts it to the
//! subscription engine's handler interface so sagas consume their own
//! durable group, independent of the projections.

pub mod error;
pub mod opening_balance;
pub mod saga;

pub use error::{CommandDispatchError, SagaError};
pub use opening_balance::OpeningBalanceSaga;
pub use saga::{CommandSender, Saga, SagaConfig, SagaEventHandler};
