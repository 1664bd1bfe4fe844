//! Read models and projections for the CQRS query side.
//!
//! Each view folds one aggregate's events into a queryable in-memory model
//! and implements the engine's [`subscriptions::EventHandler`] seam, so it
//! plugs straight into a subscription consumer. The provider types wire the
//! views into a handler registry at startup.

pub mod error;
pub mod provider;
pub mod views;

pub use error::{ProjectionError, Result};
pub use provider::{AccountProjectionConfig, MovementTypeProjectionConfig};
pub use views::{AccountBalancesView, AccountSummary, MovementTypeSummary, MovementTypesView};
