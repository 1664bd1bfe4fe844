//! Read model views for the CQRS query side.

pub mod account_balances;
pub mod movement_types;

pub use account_balances::{AccountBalancesView, AccountSummary};
pub use movement_types::{MovementTypeSummary, MovementTypesView};
